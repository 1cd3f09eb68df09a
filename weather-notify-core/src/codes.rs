use std::collections::HashMap;

/// Description used for any code the table does not know.
pub const UNKNOWN_WEATHER: &str = "未知";

/// Xiaomi weather condition codes.
const XIAOMI_CODES: &[(i64, &str)] = &[
    (0, "晴"),
    (1, "多云"),
    (2, "阴"),
    (3, "阵雨"),
    (4, "雷阵雨"),
    (5, "雷阵雨并伴有冰雹"),
    (6, "雨夹雪"),
    (7, "小雨"),
    (8, "中雨"),
    (9, "大雨"),
    (10, "暴雨"),
    (11, "大暴雨"),
    (12, "特大暴雨"),
    (13, "阵雪"),
    (14, "小雪"),
    (15, "中雪"),
    (16, "大雪"),
    (17, "暴雪"),
    (18, "雾"),
    (19, "冻雨"),
    (20, "沙尘暴"),
    (21, "小雨-中雨"),
    (22, "中雨-大雨"),
    (23, "大雨-暴雨"),
    (24, "暴雨-大暴雨"),
    (25, "大暴雨-特大暴雨"),
    (26, "小雪-中雪"),
    (27, "中雪-大雪"),
    (28, "大雪-暴雪"),
    (29, "浮沉"),
    (30, "扬沙"),
    (31, "强沙尘暴"),
    (32, "飑"),
    (33, "龙卷风"),
    (34, "若高吹雪"),
    (35, "轻雾"),
    (53, "霾"),
    (99, "未知"),
];

/// Lookup table from a numeric weather code to its human-readable description.
#[derive(Debug, Clone)]
pub struct WeatherCodes {
    table: HashMap<i64, String>,
}

impl WeatherCodes {
    pub fn describe(&self, code: i64) -> &str {
        self.table.get(&code).map(String::as_str).unwrap_or(UNKNOWN_WEATHER)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for WeatherCodes {
    fn default() -> Self {
        XIAOMI_CODES.iter().map(|(code, desc)| (*code, *desc)).collect()
    }
}

impl<S: Into<String>> FromIterator<(i64, S)> for WeatherCodes {
    fn from_iter<I: IntoIterator<Item = (i64, S)>>(iter: I) -> Self {
        Self { table: iter.into_iter().map(|(code, desc)| (code, desc.into())).collect() }
    }
}
