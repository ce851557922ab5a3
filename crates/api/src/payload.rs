//! Order request bodies, accepted as `multipart/form-data` or JSON.
//!
//! Decoding happens in two stages. [`OrderPayload`] first collects every
//! field into one JSON object (multipart text fields, then the `orderData`
//! JSON string merged over them) and holds the optional image. Handlers
//! then decode the merged object into their typed request and validate it.

use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use sarathi_cloud::format::{is_allowed_format, ALLOWED_FORMATS};
use sarathi_cloud::UploadRequest;
use sarathi_core::error::CoreError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::state::AppState;

/// Multipart field carrying the order image.
pub const IMAGE_FIELD: &str = "orderImage";

/// Text field carrying a JSON object merged over the other fields.
pub const ORDER_DATA_FIELD: &str = "orderData";

/// Order fields and an optional image, before typed decoding.
#[derive(Debug, Default)]
pub struct OrderPayload {
    pub fields: Map<String, Value>,
    pub image: Option<UploadRequest>,
}

impl OrderPayload {
    /// Decode the merged fields into a typed request.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))
    }
}

impl FromRequest<AppState> for OrderPayload {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        let mut payload = if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            read_multipart(multipart).await?
        } else {
            let Json(body) = Json::<Value>::from_request(req, state).await?;
            match body {
                Value::Object(fields) => OrderPayload {
                    fields,
                    image: None,
                },
                _ => {
                    return Err(AppError::BadRequest(
                        "Request body must be a JSON object".into(),
                    ))
                }
            }
        };

        if let Some(Value::String(raw)) = payload.fields.remove(ORDER_DATA_FIELD) {
            merge_order_data(&mut payload.fields, &raw)?;
        }
        Ok(payload)
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<OrderPayload, AppError> {
    let mut payload = OrderPayload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGE_FIELD && field.file_name().is_some() {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;

            // Browsers send an empty part when no file was chosen.
            if bytes.is_empty() {
                continue;
            }
            if !is_allowed_format(&filename, content_type.as_deref()) {
                return Err(AppError::BadRequest(format!(
                    "Invalid file format. Allowed formats: {}",
                    ALLOWED_FORMATS.join(", ")
                )));
            }

            payload.image = Some(UploadRequest {
                bytes: bytes.to_vec(),
                filename,
                content_type,
            });
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            payload.fields.insert(name, Value::String(text));
        }
    }

    Ok(payload)
}

/// Parse `raw` as a JSON object and merge it over `fields`.
pub fn merge_order_data(fields: &mut Map<String, Value>, raw: &str) -> Result<(), AppError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(data)) => {
            fields.extend(data);
            Ok(())
        }
        _ => Err(AppError::BadRequest("Invalid order data format".into())),
    }
}

/// `deserialize_with` helpers accepting both JSON-typed values and the
/// plain strings multipart forms produce. Blank strings and `null` decode
/// as `None`.
pub mod lenient {
    use sarathi_core::order::OrderItem;
    use sarathi_core::types::Timestamp;
    use sarathi_core::validation::parse_client_date;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            other => other,
        })
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match present(d)? {
            None => None,
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(other) => Some(other.to_string()),
        })
    }

    /// Like [`string`] but never trims, for passwords.
    pub fn secret<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        match present(d)? {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(D::Error::custom(format!("expected a string, got {other}"))),
        }
    }

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        match present(d)? {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid id: {n}"))),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid id: '{s}'"))),
            Some(other) => Err(D::Error::custom(format!("invalid id: {other}"))),
        }
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        match present(d)? {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid number: {n}"))),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid number: '{s}'"))),
            Some(other) => Err(D::Error::custom(format!("invalid number: {other}"))),
        }
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        match present(d)? {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(b)),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(D::Error::custom(format!("invalid boolean: '{s}'"))),
            },
            Some(other) => Err(D::Error::custom(format!("invalid boolean: {other}"))),
        }
    }

    pub fn timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Timestamp>, D::Error> {
        match present(d)? {
            None => Ok(None),
            Some(Value::String(s)) => parse_client_date(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date: '{s}'"))),
            Some(other) => Err(D::Error::custom(format!("invalid date: {other}"))),
        }
    }

    // Patch fields: `None` when the key is absent (via `#[serde(default)]`),
    // `Some(None)` when it is null or blank, which clears the column.

    pub fn clearable_string<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Option<String>>, D::Error> {
        string(d).map(Some)
    }

    pub fn clearable_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<i64>>, D::Error> {
        id(d).map(Some)
    }

    pub fn clearable_timestamp<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Option<Timestamp>>, D::Error> {
        timestamp(d).map(Some)
    }

    /// Line items as a JSON array, or a string holding one.
    pub fn items<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<OrderItem>>, D::Error> {
        let value = match present(d)? {
            None => return Ok(None),
            Some(Value::String(s)) => serde_json::from_str::<Value>(&s)
                .map_err(|e| D::Error::custom(format!("invalid items: {e}")))?,
            Some(other) => other,
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid items: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Decoded {
        #[serde(default, deserialize_with = "lenient::string")]
        customer_phone: Option<String>,
        #[serde(default, deserialize_with = "lenient::id")]
        assigned_to: Option<i64>,
        #[serde(default, deserialize_with = "lenient::number")]
        total: Option<f64>,
        #[serde(default, deserialize_with = "lenient::flag")]
        is_paid: Option<bool>,
        #[serde(default, deserialize_with = "lenient::items")]
        items: Option<Vec<sarathi_core::order::OrderItem>>,
    }

    #[test]
    fn order_data_overrides_form_fields() {
        let mut fields = Map::new();
        fields.insert("customerName".into(), json!("Form"));
        fields.insert("notes".into(), json!("kept"));

        merge_order_data(&mut fields, r#"{"customerName":"Json","total":10}"#).unwrap();

        assert_eq!(fields["customerName"], "Json");
        assert_eq!(fields["notes"], "kept");
        assert_eq!(fields["total"], 10);
    }

    #[test]
    fn malformed_order_data_is_rejected() {
        let mut fields = Map::new();
        let err = merge_order_data(&mut fields, "{not json").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Invalid order data format"));

        let err = merge_order_data(&mut fields, "[1,2]").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn multipart_strings_decode_into_typed_fields() {
        let payload = OrderPayload {
            fields: json!({
                "customerPhone": 9000000000_i64,
                "assignedTo": "7",
                "total": "1250.50",
                "isPaid": "TRUE",
                "items": r#"[{"productId":1,"productName":"Wire","quantity":2,"price":10}]"#,
            })
            .as_object()
            .cloned()
            .unwrap(),
            image: None,
        };

        let decoded: Decoded = payload.decode().unwrap();
        assert_eq!(decoded.customer_phone.as_deref(), Some("9000000000"));
        assert_eq!(decoded.assigned_to, Some(7));
        assert_eq!(decoded.total, Some(1250.5));
        assert_eq!(decoded.is_paid, Some(true));
        assert_eq!(decoded.items.unwrap()[0].product_name, "Wire");
    }

    #[test]
    fn blank_values_decode_as_none() {
        let payload = OrderPayload {
            fields: json!({ "assignedTo": "", "total": null, "customerPhone": "  " })
                .as_object()
                .cloned()
                .unwrap(),
            image: None,
        };

        let decoded: Decoded = payload.decode().unwrap();
        assert!(decoded.assigned_to.is_none());
        assert!(decoded.total.is_none());
        assert!(decoded.customer_phone.is_none());
    }

    #[test]
    fn clearable_fields_tell_absent_from_null() {
        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Patch {
            #[serde(default, deserialize_with = "lenient::clearable_id")]
            assigned_to: Option<Option<i64>>,
            #[serde(default, deserialize_with = "lenient::clearable_string")]
            notes: Option<Option<String>>,
            #[serde(default, deserialize_with = "lenient::clearable_timestamp")]
            dispatch_date: Option<Option<sarathi_core::types::Timestamp>>,
        }

        let patch: Patch =
            serde_json::from_value(json!({ "assignedTo": null, "notes": "" })).unwrap();
        assert_eq!(patch.assigned_to, Some(None));
        assert_eq!(patch.notes, Some(None));
        assert_eq!(patch.dispatch_date, None);

        let patch: Patch =
            serde_json::from_value(json!({ "assignedTo": "4", "dispatchDate": "2025-03-01" }))
                .unwrap();
        assert_eq!(patch.assigned_to, Some(Some(4)));
        assert_eq!(patch.notes, None);
        assert!(matches!(patch.dispatch_date, Some(Some(_))));
    }

    #[test]
    fn bad_number_is_a_validation_error() {
        let payload = OrderPayload {
            fields: json!({ "total": "lots" }).as_object().cloned().unwrap(),
            image: None,
        };
        let err = payload.decode::<Decoded>().unwrap_err();
        assert!(matches!(err, AppError::Core(CoreError::Validation(_))));
    }
}
