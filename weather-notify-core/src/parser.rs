//! Defensive parsing of the host's weather payload.
//!
//! The payload is only loosely structured: any key may be missing and any
//! forecast array may be shorter than expected. Nothing here fails hard;
//! missing pieces render as [`NOT_AVAILABLE`] and only an undecodable
//! (or non-object) payload yields `None`.

use serde_json::Value;

use crate::{
    codes::{UNKNOWN_WEATHER, WeatherCodes},
    model::{Alert, AlertImages, NOT_AVAILABLE, WeatherRecord},
};

/// Number of forecast entries shown per line.
const SLOTS: usize = 3;
const SEPARATOR: &str = " | ";

/// `Weather_Data` as handed over by the host: raw JSON text or an already decoded object.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherPayload {
    Text(String),
    Object(Value),
}

impl WeatherPayload {
    pub fn parse(&self, codes: &WeatherCodes) -> Option<WeatherRecord> {
        match self {
            WeatherPayload::Text(text) => parse_weather_str(codes, text),
            WeatherPayload::Object(value) => parse_weather(codes, value),
        }
    }
}

pub fn parse_weather_str(codes: &WeatherCodes, json: &str) -> Option<WeatherRecord> {
    match serde_json::from_str::<Value>(json) {
        Ok(value) => parse_weather(codes, &value),
        Err(e) => {
            tracing::warn!("Failed to decode weather payload: {}", e);
            None
        }
    }
}

pub fn parse_weather(codes: &WeatherCodes, data: &Value) -> Option<WeatherRecord> {
    if !data.is_object() {
        tracing::warn!("Weather payload is not a JSON object, ignoring");
        return None;
    }

    // Indexing a `Value` by key yields `Null` for anything missing.
    let daily = &data["forecastDaily"];
    let hourly = &data["forecastHourly"];

    let daily_temp = render_slots(series(&daily["temperature"]), |entry| {
        let from = scalar_text(&entry["from"])?;
        let to = scalar_text(&entry["to"])?;
        Some(format!("{from}℃~{to}℃"))
    });

    let daily_precip = render_slots(series(&daily["precipitationProbability"]), |entry| {
        scalar_text(entry).map(|p| format!("{p}%"))
    });

    let temps = series(&hourly["temperature"]);
    let conditions = series(&hourly["weather"]);
    let hourly_weather = join_slots((0..SLOTS).map(|i| {
        let temp = scalar_text(temps.get(i)?)?;
        let condition = describe_code(codes, conditions.get(i)?);
        Some(format!("{condition} {temp}℃"))
    }));

    let alerts = data["alerts"]
        .as_array()
        .map(|items| items.iter().filter_map(parse_alert).collect())
        .unwrap_or_default();

    Some(WeatherRecord { daily_temp, daily_precip, hourly_weather, alerts })
}

/// The `value` array of a forecast series, or an empty slice.
fn series(node: &Value) -> &[Value] {
    node["value"].as_array().map(Vec::as_slice).unwrap_or(&[])
}

fn render_slots<F>(entries: &[Value], render: F) -> String
where
    F: Fn(&Value) -> Option<String>,
{
    join_slots((0..SLOTS).map(|i| entries.get(i).and_then(&render)))
}

fn join_slots(slots: impl Iterator<Item = Option<String>>) -> String {
    slots
        .map(|slot| slot.unwrap_or_else(|| NOT_AVAILABLE.to_string()))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Render a JSON scalar the way it reads in the payload. Strings and numbers only.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i.to_string()),
            None => n.as_f64().filter(|f| f.is_finite()).map(|f| f.to_string()),
        },
        _ => None,
    }
}

fn describe_code(codes: &WeatherCodes, value: &Value) -> String {
    let code = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match code {
        Some(code) => codes.describe(code).to_string(),
        None => UNKNOWN_WEATHER.to_string(),
    }
}

fn parse_alert(value: &Value) -> Option<Alert> {
    if !value.is_object() {
        tracing::debug!("Skipping malformed alert entry: {}", value);
        return None;
    }

    let text = |node: &Value| scalar_text(node).unwrap_or_default();

    Some(Alert {
        title: text(&value["title"]),
        detail: text(&value["detail"]),
        kind: text(&value["type"]),
        level: text(&value["level"]),
        pub_time: text(&value["pubTime"]),
        images: AlertImages { icon: text(&value["images"]["icon"]) },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> Value {
        json!({
            "forecastDaily": {
                "temperature": {
                    "value": [
                        {"from": "30", "to": "22"},
                        {"from": 31, "to": 23},
                        {"from": "29", "to": "21"},
                        {"from": "28", "to": "20"}
                    ]
                },
                "precipitationProbability": {
                    "value": ["10", 40, "80", "90"]
                }
            },
            "forecastHourly": {
                "temperature": {"value": [25, 26.5, "27", 28]},
                "weather": {"value": [0, "7", 1, 2]}
            },
            "alerts": [
                {
                    "title": "暴雨蓝色预警",
                    "detail": "北京市气象台发布暴雨蓝色预警：预计今天夜间有大雨。",
                    "type": "暴雨",
                    "level": "蓝色",
                    "pubTime": "2024-07-01T10:00:00+08:00",
                    "images": {"icon": "https://example.com/icons/rain_blue.png"}
                }
            ]
        })
    }

    #[test]
    fn parses_complete_payload() {
        let record = parse_weather(&WeatherCodes::default(), &full_payload()).unwrap();

        assert_eq!(record.daily_temp, "30℃~22℃ | 31℃~23℃ | 29℃~21℃");
        assert_eq!(record.daily_precip, "10% | 40% | 80%");
        assert_eq!(record.hourly_weather, "晴 25℃ | 小雨 26.5℃ | 多云 27℃");

        assert_eq!(record.alerts.len(), 1);
        let alert = record.first_alert().unwrap();
        assert_eq!(alert.level, "蓝色");
        assert_eq!(alert.images.icon, "https://example.com/icons/rain_blue.png");
    }

    #[test]
    fn short_arrays_are_padded_with_na() {
        let payload = json!({
            "forecastDaily": {
                "temperature": {"value": [{"from": 30, "to": 22}]},
                "precipitationProbability": {"value": [10, 20]}
            },
            "forecastHourly": {
                "temperature": {"value": [25, 26, 27]},
                "weather": {"value": [0]}
            }
        });

        let record = parse_weather(&WeatherCodes::default(), &payload).unwrap();

        assert_eq!(record.daily_temp, "30℃~22℃ | N/A | N/A");
        assert_eq!(record.daily_precip, "10% | 20% | N/A");
        assert_eq!(record.hourly_weather, "晴 25℃ | N/A | N/A");
        assert!(record.alerts.is_empty());
    }

    #[test]
    fn missing_sections_yield_all_na() {
        let record = parse_weather(&WeatherCodes::default(), &json!({})).unwrap();

        assert_eq!(record.daily_temp, "N/A | N/A | N/A");
        assert_eq!(record.daily_precip, "N/A | N/A | N/A");
        assert_eq!(record.hourly_weather, "N/A | N/A | N/A");
        assert!(record.alerts.is_empty());
    }

    #[test]
    fn wrongly_shaped_sections_do_not_panic() {
        let payload = json!({
            "forecastDaily": "oops",
            "forecastHourly": {"temperature": {"value": {"0": 1}}, "weather": []},
            "alerts": {"detail": "not a list"}
        });

        let record = parse_weather(&WeatherCodes::default(), &payload).unwrap();
        assert_eq!(record.daily_temp, "N/A | N/A | N/A");
        assert_eq!(record.hourly_weather, "N/A | N/A | N/A");
        assert!(record.alerts.is_empty());
    }

    #[test]
    fn incomplete_daily_entry_is_na() {
        let payload = json!({
            "forecastDaily": {
                "temperature": {"value": [{"from": 30}, {"from": 1, "to": -3}, null]}
            }
        });

        let record = parse_weather(&WeatherCodes::default(), &payload).unwrap();
        assert_eq!(record.daily_temp, "N/A | 1℃~-3℃ | N/A");
    }

    #[test]
    fn unknown_weather_code_renders_unknown() {
        let payload = json!({
            "forecastHourly": {
                "temperature": {"value": [20, 21, 22]},
                "weather": {"value": [77, "cloudy", null]}
            }
        });

        let record = parse_weather(&WeatherCodes::default(), &payload).unwrap();
        assert_eq!(record.hourly_weather, "未知 20℃ | 未知 21℃ | 未知 22℃");
    }

    #[test]
    fn invalid_json_yields_none() {
        assert!(parse_weather_str(&WeatherCodes::default(), "{not json").is_none());
        assert!(parse_weather_str(&WeatherCodes::default(), "").is_none());
    }

    #[test]
    fn non_object_payload_yields_none() {
        assert!(parse_weather_str(&WeatherCodes::default(), "[1, 2, 3]").is_none());
        assert!(parse_weather(&WeatherCodes::default(), &json!("text")).is_none());
    }

    #[test]
    fn malformed_alerts_are_skipped() {
        let payload = json!({
            "alerts": [
                "garbage",
                {"detail": "大风预警：阵风8级"},
                {"images": {"icon": 5}}
            ]
        });

        let record = parse_weather(&WeatherCodes::default(), &payload).unwrap();
        assert_eq!(record.alerts.len(), 2);
        assert_eq!(record.alerts[0].detail, "大风预警：阵风8级");
        assert_eq!(record.alerts[0].images.icon, "");
        assert_eq!(record.alerts[1].detail, "");
    }

    #[test]
    fn text_and_object_payloads_agree() {
        let codes = WeatherCodes::default();
        let object = WeatherPayload::Object(full_payload());
        let text = WeatherPayload::Text(full_payload().to_string());

        assert_eq!(object.parse(&codes), text.parse(&codes));
    }
}
