//! Stations (Homebase units and their self-hosted cousins): typed records
//! and the bridge from cloud records to live p2p sessions.

use std::net::IpAddr;

use eufy_p2p::{CommandType, Session, SessionOptions, StationIdentity};
use serde::Deserialize;

use crate::api::Api;
use crate::device::DeviceType;
use crate::error::CloudError;
use crate::params::{ParamRow, Params};

/// Arming states accepted by CMD_SET_ARMING.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GuardMode {
    Away = 0,
    Home = 1,
    Schedule = 2,
    Disarmed = 63,
}

impl GuardMode {
    pub fn raw(self) -> u8 {
        self as u8
    }
}

/// Account member owning the station, as far as the p2p protocol cares.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub action_user_id: String,
}

/// Station record from `app/get_hubs_list`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationInfo {
    pub station_sn: String,
    #[serde(default)]
    pub station_name: String,
    #[serde(default)]
    pub station_model: String,
    #[serde(default)]
    pub device_type: i64,
    #[serde(default)]
    pub main_sw_version: String,
    #[serde(default)]
    pub main_hw_version: String,
    #[serde(default)]
    pub wifi_mac: String,
    #[serde(default)]
    pub ip_addr: String,
    #[serde(default)]
    pub p2p_did: String,
    #[serde(default)]
    pub member: Member,
    #[serde(default)]
    pub params: Vec<ParamRow>,
}

/// A station record plus the API handle needed to operate on it.
pub struct Station<'a> {
    api: &'a Api,
    info: StationInfo,
}

impl<'a> Station<'a> {
    pub(crate) fn new(api: &'a Api, info: StationInfo) -> Station<'a> {
        Station { api, info }
    }

    pub fn serial(&self) -> &str {
        &self.info.station_sn
    }

    pub fn name(&self) -> &str {
        &self.info.station_name
    }

    pub fn model(&self) -> &str {
        &self.info.station_model
    }

    pub fn software_version(&self) -> &str {
        &self.info.main_sw_version
    }

    pub fn hardware_version(&self) -> &str {
        &self.info.main_hw_version
    }

    pub fn mac(&self) -> &str {
        &self.info.wifi_mac
    }

    pub fn device_type(&self) -> Option<DeviceType> {
        DeviceType::from_raw(self.info.device_type)
    }

    /// LAN address the cloud last saw the station on.
    pub fn ip(&self) -> Option<IpAddr> {
        self.info.ip_addr.parse().ok()
    }

    pub fn params(&self) -> Params {
        Params::from_rows(&self.info.params)
    }

    pub fn info(&self) -> &StationInfo {
        &self.info
    }

    /// Fetch this station's DSK key and open a p2p session to it.
    pub async fn connect(&self, options: SessionOptions) -> Result<Session, CloudError> {
        let identity = self.p2p_identity().await?;
        Ok(Session::connect(&identity, options).await?)
    }

    async fn p2p_identity(&self) -> Result<StationIdentity, CloudError> {
        if self.info.p2p_did.is_empty() || self.info.member.action_user_id.is_empty() {
            return Err(CloudError::MissingP2pIdentity(self.serial().to_string()));
        }
        let dsk_key = self.api.dsk_key(self.serial()).await?;
        Ok(StationIdentity {
            serial: self.serial().to_string(),
            p2p_did: self.info.p2p_did.clone(),
            dsk_key,
            actor_id: self.info.member.action_user_id.clone(),
        })
    }

    /// Arm or disarm the station. Rides an existing session when it fits,
    /// otherwise a short-lived one.
    pub async fn set_guard_mode(
        &self,
        mode: GuardMode,
        session: Option<&Session>,
    ) -> Result<(), CloudError> {
        if let Some(session) = session {
            if session.valid_for(self.serial()) {
                session
                    .send_command_with_int(0, CommandType::CmdSetArming, mode.raw())
                    .await?;
                return Ok(());
            }
        }
        let mut session = self.connect(SessionOptions::default()).await?;
        let sent = session
            .send_command_with_int(0, CommandType::CmdSetArming, mode.raw())
            .await;
        session.close().await;
        sent?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_modes_use_the_vendor_values() {
        assert_eq!(GuardMode::Away.raw(), 0);
        assert_eq!(GuardMode::Home.raw(), 1);
        assert_eq!(GuardMode::Schedule.raw(), 2);
        assert_eq!(GuardMode::Disarmed.raw(), 63);
    }

    #[test]
    fn station_record_parses_with_missing_fields() {
        let info: StationInfo = serde_json::from_str(
            r#"{
                "station_sn": "T8010P1234567890",
                "station_name": "Home",
                "station_model": "T8010",
                "device_type": 0,
                "ip_addr": "192.168.1.42",
                "p2p_did": "ABCDE-123456-FGHIJ",
                "member": {"action_user_id": "abcdef0123456789"},
                "params": [{"param_type": 1224, "param_value": "1"}]
            }"#,
        )
        .unwrap();
        assert_eq!(info.station_sn, "T8010P1234567890");
        assert_eq!(info.member.action_user_id, "abcdef0123456789");
        assert_eq!(info.wifi_mac, "");
        assert_eq!(DeviceType::from_raw(info.device_type), Some(DeviceType::Station));
    }

    #[test]
    fn station_without_member_still_parses() {
        let info: StationInfo =
            serde_json::from_str(r#"{"station_sn": "T8010P1234567890"}"#).unwrap();
        assert_eq!(info.member.action_user_id, "");
        assert_eq!(info.p2p_did, "");
    }

    #[tokio::test]
    async fn connect_requires_a_p2p_identity() {
        let api = Api::new("user@example.com", "hunter2");
        let info: StationInfo =
            serde_json::from_str(r#"{"station_sn": "T8010P1234567890"}"#).unwrap();
        let station = Station::new(&api, info);
        let err = station.connect(SessionOptions::default()).await.unwrap_err();
        assert!(matches!(err, CloudError::MissingP2pIdentity(_)));
    }

    #[test]
    fn lan_address_parses_when_present() {
        let info: StationInfo = serde_json::from_str(
            r#"{"station_sn": "T8010P1234567890", "ip_addr": "192.168.1.42"}"#,
        )
        .unwrap();
        let api = Api::new("user@example.com", "hunter2");
        let station = Station::new(&api, info);
        assert_eq!(station.ip(), "192.168.1.42".parse().ok());

        let blank: StationInfo =
            serde_json::from_str(r#"{"station_sn": "T8010P1234567890"}"#).unwrap();
        let station = Station::new(&api, blank);
        assert!(station.ip().is_none());
    }
}
