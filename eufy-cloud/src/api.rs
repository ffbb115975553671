//! HTTPS client for the vendor cloud: authentication, device and station
//! registries, parameter upload, and the stream relay endpoints.
//!
//! Every endpoint is a POST returning `{code, msg, data}`; code 0 means
//! success. Login may hand back a regional domain that replaces the
//! default base for the rest of the process.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use log::info;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::device::{Device, DeviceInfo};
use crate::error::CloudError;
use crate::params::ParamType;
use crate::station::{Station, StationInfo};

/// Default service root. Login may redirect to a regional domain.
pub const API_BASE: &str = "https://mysecurity.eufylife.com/api/v1";

/// Business code the service uses for dead credentials on a 200 response.
const CODE_INVALID_CREDENTIALS: i64 = 26006;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    msg: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    auth_token: String,
    token_expires_at: i64,
    #[serde(default)]
    domain: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DskKeyData {
    #[serde(default)]
    dsk_keys: Vec<DskKeyRow>,
}

#[derive(Debug, Deserialize)]
struct DskKeyRow {
    station_sn: String,
    dsk_key: String,
}

#[derive(Debug, Deserialize)]
struct StreamData {
    url: String,
}

struct AuthState {
    base: String,
    token: Option<String>,
    token_expires_at: i64,
}

/// Authenticated cloud client plus its device and station registries.
pub struct Api {
    http: reqwest::Client,
    email: String,
    password: String,
    auth: Mutex<AuthState>,
    devices: Mutex<HashMap<String, DeviceInfo>>,
    stations: Mutex<HashMap<String, StationInfo>>,
}

impl Api {
    /// Build an unauthenticated client. [`Api::login`] is the usual entry.
    pub fn new(email: &str, password: &str) -> Api {
        Api {
            http: reqwest::Client::new(),
            email: email.to_string(),
            password: password.to_string(),
            auth: Mutex::new(AuthState {
                base: API_BASE.to_string(),
                token: None,
                token_expires_at: 0,
            }),
            devices: Mutex::new(HashMap::new()),
            stations: Mutex::new(HashMap::new()),
        }
    }

    /// Authenticate and prime the registries.
    pub async fn login(email: &str, password: &str) -> Result<Api, CloudError> {
        let api = Api::new(email, password);
        api.authenticate().await?;
        api.update_device_info().await?;
        Ok(api)
    }

    /// Trade the credentials for a fresh token, following the regional
    /// domain handoff when the service asks for one.
    async fn authenticate(&self) -> Result<(), CloudError> {
        let url = format!("{}/passport/login", self.auth.lock().await.base);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "email": &self.email, "password": &self.password }))
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(CloudError::InvalidCredentials);
        }
        let envelope: Envelope<LoginData> = response.error_for_status()?.json().await?;
        if envelope.code != 0 {
            return Err(map_code(envelope.code, envelope.msg));
        }
        let data = envelope
            .data
            .ok_or_else(|| CloudError::MissingData("passport/login".to_string()))?;

        let mut auth = self.auth.lock().await;
        auth.token = Some(data.auth_token);
        auth.token_expires_at = data.token_expires_at;
        if let Some(domain) = data.domain {
            let base = format!("https://{}/v1", domain);
            if base != auth.base {
                info!("switching to regional api base {}", base);
                auth.base = base;
            }
        }
        Ok(())
    }

    /// Re-authenticate ahead of a request when the token is missing or
    /// past its expiry.
    async fn ensure_token(&self) -> Result<(), CloudError> {
        let stale = {
            let auth = self.auth.lock().await;
            auth.token.is_none() || now_epoch() >= auth.token_expires_at
        };
        if stale {
            info!("access token missing or expired; fetching a new one");
            self.authenticate().await?;
        }
        Ok(())
    }

    /// POST an endpoint and unwrap the envelope. Retries exactly once
    /// through a re-authentication when the service answers 401.
    async fn request_raw<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Option<T>, CloudError> {
        self.ensure_token().await?;
        let mut retried = false;
        loop {
            let (url, token) = {
                let auth = self.auth.lock().await;
                (format!("{}/{}", auth.base, endpoint), auth.token.clone())
            };
            let mut request = self.http.post(&url);
            if let Some(token) = &token {
                request = request.header("x-auth-token", token);
            }
            if let Some(body) = body {
                request = request.json(body);
            }
            let response = request.send().await?;
            if response.status() == StatusCode::UNAUTHORIZED {
                if retried {
                    return Err(CloudError::InvalidCredentials);
                }
                info!("token rejected by {}; authenticating again", endpoint);
                retried = true;
                self.authenticate().await?;
                continue;
            }
            let envelope: Envelope<T> = response.error_for_status()?.json().await?;
            if envelope.code != 0 {
                return Err(map_code(envelope.code, envelope.msg));
            }
            return Ok(envelope.data);
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<T, CloudError> {
        self.request_raw(endpoint, body)
            .await?
            .ok_or_else(|| CloudError::MissingData(endpoint.to_string()))
    }

    /// Refresh both registries from the cloud. An account with no
    /// hardware yields empty lists, not an error.
    pub async fn update_device_info(&self) -> Result<(), CloudError> {
        let devices: Option<Vec<DeviceInfo>> =
            self.request_raw("app/get_devs_list", None).await?;
        if let Some(devices) = devices {
            let mut registry = self.devices.lock().await;
            for info in devices {
                registry.insert(info.device_sn.clone(), info);
            }
        }

        let stations: Option<Vec<StationInfo>> =
            self.request_raw("app/get_hubs_list", None).await?;
        if let Some(stations) = stations {
            let mut registry = self.stations.lock().await;
            for info in stations {
                registry.insert(info.station_sn.clone(), info);
            }
        }
        Ok(())
    }

    /// Devices currently in the registry, in serial order.
    pub async fn devices(&self) -> Vec<Device<'_>> {
        let registry = self.devices.lock().await;
        let mut infos: Vec<DeviceInfo> = registry.values().cloned().collect();
        infos.sort_by(|a, b| a.device_sn.cmp(&b.device_sn));
        infos.into_iter().map(|info| Device::new(self, info)).collect()
    }

    pub async fn device(&self, serial: &str) -> Option<Device<'_>> {
        let registry = self.devices.lock().await;
        registry.get(serial).cloned().map(|info| Device::new(self, info))
    }

    /// Stations currently in the registry, in serial order.
    pub async fn stations(&self) -> Vec<Station<'_>> {
        let registry = self.stations.lock().await;
        let mut infos: Vec<StationInfo> = registry.values().cloned().collect();
        infos.sort_by(|a, b| a.station_sn.cmp(&b.station_sn));
        infos.into_iter().map(|info| Station::new(self, info)).collect()
    }

    pub async fn station(&self, serial: &str) -> Option<Station<'_>> {
        let registry = self.stations.lock().await;
        registry.get(serial).cloned().map(|info| Station::new(self, info))
    }

    /// Full event history for the account, as raw JSON.
    pub async fn history(&self) -> Result<Value, CloudError> {
        self.request("event/app/get_all_history_record", None).await
    }

    /// DSK key for one station, required by the p2p handshake.
    pub(crate) async fn dsk_key(&self, station_sn: &str) -> Result<String, CloudError> {
        let body = json!({ "station_sns": [station_sn] });
        let data: DskKeyData = self
            .request("app/equipment/get_dsk_keys", Some(&body))
            .await?;
        data.dsk_keys
            .into_iter()
            .find(|row| row.station_sn == station_sn)
            .map(|row| row.dsk_key)
            .ok_or_else(|| CloudError::MissingDskKey(station_sn.to_string()))
    }

    pub(crate) async fn upload_devs_params(
        &self,
        device_sn: &str,
        station_sn: &str,
        params: &[(ParamType, Value)],
    ) -> Result<(), CloudError> {
        let rows: Vec<Value> = params
            .iter()
            .map(|(kind, value)| {
                json!({ "param_type": kind.raw(), "param_value": kind.write_value(value) })
            })
            .collect();
        let body = json!({
            "device_sn": device_sn,
            "station_sn": station_sn,
            "params": rows,
        });
        self.request_raw::<Value>("app/upload_devs_params", Some(&body))
            .await?;
        Ok(())
    }

    pub(crate) async fn start_stream(
        &self,
        device_sn: &str,
        station_sn: &str,
    ) -> Result<String, CloudError> {
        let body = json!({ "device_sn": device_sn, "station_sn": station_sn, "proto": 2 });
        let data: StreamData = self
            .request("web/equipment/start_stream", Some(&body))
            .await?;
        Ok(data.url)
    }

    pub(crate) async fn stop_stream(
        &self,
        device_sn: &str,
        station_sn: &str,
    ) -> Result<(), CloudError> {
        let body = json!({ "device_sn": device_sn, "station_sn": station_sn, "proto": 2 });
        self.request_raw::<Value>("web/equipment/stop_stream", Some(&body))
            .await?;
        Ok(())
    }
}

fn map_code(code: i64, msg: String) -> CloudError {
    if code == CODE_INVALID_CREDENTIALS {
        CloudError::InvalidCredentials
    } else {
        CloudError::Rejected { code, msg }
    }
}

fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_envelope_parses() {
        let envelope: Envelope<LoginData> = serde_json::from_str(
            r#"{
                "code": 0,
                "msg": "Succeed.",
                "data": {
                    "user_id": "xxxxxxxx",
                    "email": "user@example.com",
                    "nick_name": "",
                    "auth_token": "token-value",
                    "token_expires_at": 1893456000,
                    "domain": "security-app.eufylife.com",
                    "ab_code": "US",
                    "params": [{"param_type": 10000, "param_value": "xx"}]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(envelope.code, 0);
        let data = envelope.data.unwrap();
        assert_eq!(data.auth_token, "token-value");
        assert_eq!(data.token_expires_at, 1893456000);
        assert_eq!(data.domain.as_deref(), Some("security-app.eufylife.com"));
    }

    #[test]
    fn envelope_data_may_be_absent() {
        let envelope: Envelope<LoginData> =
            serde_json::from_str(r#"{"code": 0, "msg": "Succeed."}"#).unwrap();
        assert!(envelope.data.is_none());

        let envelope: Envelope<Vec<DeviceInfo>> =
            serde_json::from_str(r#"{"code": 0, "data": null}"#).unwrap();
        assert!(envelope.data.is_none());
        assert_eq!(envelope.msg, "");
    }

    #[test]
    fn dsk_key_envelope_parses() {
        let envelope: Envelope<DskKeyData> = serde_json::from_str(
            r#"{
                "code": 0,
                "msg": "Succeed.",
                "data": {
                    "dsk_keys": [{
                        "station_sn": "T8010P1234567890",
                        "dsk_key": "8wZ4sb7yTpeAPhpF",
                        "expiration": 1893456000,
                        "about_to_be_replaced": false
                    }]
                }
            }"#,
        )
        .unwrap();
        let keys = envelope.data.unwrap().dsk_keys;
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].dsk_key, "8wZ4sb7yTpeAPhpF");
    }

    #[test]
    fn stream_envelope_parses() {
        let envelope: Envelope<StreamData> = serde_json::from_str(
            r#"{
                "code": 0,
                "msg": "Succeed.",
                "data": {"url": "rtmp://p2p-vir-6.eufylife.com/hls/123"}
            }"#,
        )
        .unwrap();
        assert_eq!(envelope.data.unwrap().url, "rtmp://p2p-vir-6.eufylife.com/hls/123");
    }

    #[test]
    fn credential_code_maps_to_invalid_credentials() {
        assert!(matches!(
            map_code(26006, "LOGIN_PASSWORD_ERR".to_string()),
            CloudError::InvalidCredentials
        ));
        assert!(matches!(
            map_code(10094, "parameter error".to_string()),
            CloudError::Rejected { code: 10094, .. }
        ));
    }

    #[test]
    fn hub_list_envelope_parses() {
        let envelope: Envelope<Vec<StationInfo>> = serde_json::from_str(
            r#"{
                "code": 0,
                "msg": "Succeed.",
                "data": [{
                    "station_sn": "T8010P1234567890",
                    "station_name": "Home",
                    "station_model": "T8010",
                    "main_sw_version": "2.1.6",
                    "device_type": 0,
                    "p2p_did": "ABCDE-123456-FGHIJ",
                    "ip_addr": "192.168.1.42",
                    "member": {"family_id": 123, "action_user_id": "abcdef0123456789"},
                    "params": []
                }]
            }"#,
        )
        .unwrap();
        let stations = envelope.data.unwrap();
        assert_eq!(stations[0].station_sn, "T8010P1234567890");
        assert_eq!(stations[0].member.action_user_id, "abcdef0123456789");
    }
}
