//! Vendor-specific request signing and response decoding.
//!
//! Each adapter knows its own field names, language codes, signature scheme and
//! result layout. The gateway only sees `VendorAdapter`.

use crate::translation::classifier::Language;
use crate::translation::translator::TranslationRequest;
use crate::utils::{Backend, Credentials, GatewayError};
use md5::Md5;
use rand::Rng;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use sha2::{Digest, Sha256};

pub trait VendorAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    fn default_endpoint(&self) -> &'static str;

    /// Builds a fully signed request. A fresh nonce is drawn on every call.
    fn build_request(
        &self,
        client: &Client,
        endpoint: &str,
        credentials: &Credentials,
        request: &TranslationRequest,
    ) -> RequestBuilder;

    /// Extracts the first translated segment from an already parsed body.
    fn parse_response(&self, body: &Value) -> Result<String, GatewayError>;
}

pub fn adapter_for(backend: Backend) -> Box<dyn VendorAdapter> {
    match backend {
        Backend::Baidu => Box::new(BaiduAdapter),
        Backend::Youdao => Box::new(YoudaoAdapter),
    }
}

/// Error codes arrive as strings or numbers depending on the endpoint.
fn field_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn unix_seconds() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Baidu general translation API: GET with an MD5 signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaiduAdapter;

impl BaiduAdapter {
    pub fn language_code(language: Language) -> &'static str {
        match language {
            Language::Zh => "zh",
            Language::En => "en",
            Language::Unknown => "auto",
        }
    }

    pub fn sign(app_id: &str, query: &str, salt: &str, secret: &str) -> String {
        let mut hasher = Md5::new();
        hasher.update(app_id.as_bytes());
        hasher.update(query.as_bytes());
        hasher.update(salt.as_bytes());
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl VendorAdapter for BaiduAdapter {
    fn name(&self) -> &'static str {
        "Baidu Translate"
    }

    fn default_endpoint(&self) -> &'static str {
        "https://fanyi-api.baidu.com/api/trans/vip/translate"
    }

    fn build_request(
        &self,
        client: &Client,
        endpoint: &str,
        credentials: &Credentials,
        request: &TranslationRequest,
    ) -> RequestBuilder {
        let salt = rand::thread_rng().gen_range(10000..=99999u32).to_string();
        let sign = Self::sign(&credentials.app_id, &request.text, &salt, &credentials.secret);

        client.get(endpoint).query(&[
            ("q", request.text.as_str()),
            ("from", Self::language_code(request.from)),
            ("to", Self::language_code(request.to)),
            ("appid", credentials.app_id.as_str()),
            ("salt", salt.as_str()),
            ("sign", sign.as_str()),
        ])
    }

    fn parse_response(&self, body: &Value) -> Result<String, GatewayError> {
        if let Some(segments) = body.get("trans_result").and_then(Value::as_array) {
            return segments
                .first()
                .and_then(|segment| segment.get("dst"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    GatewayError::MalformedResponse("empty 'trans_result' list".to_string())
                });
        }

        Err(GatewayError::VendorError {
            code: body
                .get("error_code")
                .and_then(field_as_string)
                .unwrap_or_else(|| "unknown".to_string()),
            message: body
                .get("error_msg")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        })
    }
}

/// Youdao text translation API v3: form POST with a SHA-256 signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct YoudaoAdapter;

impl YoudaoAdapter {
    pub fn language_code(language: Language) -> &'static str {
        match language {
            Language::Zh => "zh-CHS",
            Language::En => "en",
            Language::Unknown => "auto",
        }
    }

    /// Signature input: texts over 20 chars become first 10 + length + last 10.
    pub fn truncate(query: &str) -> String {
        let chars: Vec<char> = query.chars().collect();
        let len = chars.len();
        if len <= 20 {
            return query.to_string();
        }

        let head: String = chars[..10].iter().collect();
        let tail: String = chars[len - 10..].iter().collect();
        format!("{}{}{}", head, len, tail)
    }

    pub fn sign(app_key: &str, query: &str, salt: &str, curtime: &str, secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(app_key.as_bytes());
        hasher.update(Self::truncate(query).as_bytes());
        hasher.update(salt.as_bytes());
        hasher.update(curtime.as_bytes());
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl VendorAdapter for YoudaoAdapter {
    fn name(&self) -> &'static str {
        "Youdao Translate"
    }

    fn default_endpoint(&self) -> &'static str {
        "https://openapi.youdao.com/api"
    }

    fn build_request(
        &self,
        client: &Client,
        endpoint: &str,
        credentials: &Credentials,
        request: &TranslationRequest,
    ) -> RequestBuilder {
        let salt = uuid::Uuid::new_v4().to_string();
        let curtime = unix_seconds().to_string();
        let sign = Self::sign(
            &credentials.app_id,
            &request.text,
            &salt,
            &curtime,
            &credentials.secret,
        );

        client.post(endpoint).form(&[
            ("q", request.text.as_str()),
            ("from", Self::language_code(request.from)),
            ("to", Self::language_code(request.to)),
            ("appKey", credentials.app_id.as_str()),
            ("salt", salt.as_str()),
            ("sign", sign.as_str()),
            ("signType", "v3"),
            ("curtime", curtime.as_str()),
        ])
    }

    fn parse_response(&self, body: &Value) -> Result<String, GatewayError> {
        let code = body
            .get("errorCode")
            .and_then(field_as_string)
            .unwrap_or_else(|| "unknown".to_string());

        if code != "0" {
            return Err(GatewayError::VendorError {
                message: format!("errorCode {}", code),
                code,
            });
        }

        body.get("translation")
            .and_then(Value::as_array)
            .and_then(|segments| segments.first())
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GatewayError::MalformedResponse("missing 'translation' list".to_string()))
    }
}
