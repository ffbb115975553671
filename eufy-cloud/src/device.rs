//! Devices attached to an account: typed records and per-device operations.

use serde::Deserialize;
use serde_json::Value;

use crate::api::Api;
use crate::error::CloudError;
use crate::params::{ParamRow, ParamType, Params};

/// Hardware families, as the vendor app enumerates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DeviceType {
    Station = 0,
    Camera = 1,
    Sensor = 2,
    Floodlight = 3,
    CameraE = 4,
    Doorbell = 5,
    BatteryDoorbell = 7,
    Camera2C = 8,
    Camera2 = 9,
    MotionSensor = 10,
    Keypad = 11,
    IndoorCamera = 30,
    IndoorPtCamera = 31,
    LockBasic = 50,
    LockAdvanced = 51,
    LockSimple = 52,
}

impl DeviceType {
    pub fn from_raw(raw: i64) -> Option<DeviceType> {
        match raw {
            0 => Some(DeviceType::Station),
            1 => Some(DeviceType::Camera),
            2 => Some(DeviceType::Sensor),
            3 => Some(DeviceType::Floodlight),
            4 => Some(DeviceType::CameraE),
            5 => Some(DeviceType::Doorbell),
            7 => Some(DeviceType::BatteryDoorbell),
            8 => Some(DeviceType::Camera2C),
            9 => Some(DeviceType::Camera2),
            10 => Some(DeviceType::MotionSensor),
            11 => Some(DeviceType::Keypad),
            30 => Some(DeviceType::IndoorCamera),
            31 => Some(DeviceType::IndoorPtCamera),
            50 => Some(DeviceType::LockBasic),
            51 => Some(DeviceType::LockAdvanced),
            52 => Some(DeviceType::LockSimple),
            _ => None,
        }
    }

    pub fn is_doorbell(self) -> bool {
        matches!(self, DeviceType::Doorbell | DeviceType::BatteryDoorbell)
    }

    pub fn is_camera(self) -> bool {
        matches!(
            self,
            DeviceType::Camera
                | DeviceType::Camera2
                | DeviceType::Camera2C
                | DeviceType::CameraE
                | DeviceType::Floodlight
                | DeviceType::IndoorCamera
                | DeviceType::IndoorPtCamera
                | DeviceType::Doorbell
                | DeviceType::BatteryDoorbell
        )
    }

    /// Device families that double as their own station.
    pub fn is_station(self) -> bool {
        matches!(
            self,
            DeviceType::Station | DeviceType::Doorbell | DeviceType::Floodlight
        )
    }

    pub fn is_sensor(self) -> bool {
        matches!(self, DeviceType::Sensor | DeviceType::MotionSensor)
    }
}

/// Device record from `app/get_devs_list`. Fields the cloud omits come
/// back empty rather than failing the whole listing.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceInfo {
    pub device_sn: String,
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub device_model: String,
    #[serde(default)]
    pub device_type: i64,
    #[serde(default)]
    pub station_sn: String,
    #[serde(default)]
    pub main_sw_version: String,
    #[serde(default)]
    pub main_hw_version: String,
    #[serde(default)]
    pub wifi_mac: String,
    #[serde(default)]
    pub cover_path: String,
    #[serde(default)]
    pub params: Vec<ParamRow>,
}

/// A device record plus the API handle needed to operate on it.
pub struct Device<'a> {
    api: &'a Api,
    info: DeviceInfo,
}

impl<'a> Device<'a> {
    pub(crate) fn new(api: &'a Api, info: DeviceInfo) -> Device<'a> {
        Device { api, info }
    }

    pub fn serial(&self) -> &str {
        &self.info.device_sn
    }

    pub fn name(&self) -> &str {
        &self.info.device_name
    }

    pub fn model(&self) -> &str {
        &self.info.device_model
    }

    pub fn station_serial(&self) -> &str {
        &self.info.station_sn
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

    /// URL of the latest thumbnail the cloud has for this device.
    pub fn last_image_url(&self) -> &str {
        &self.info.cover_path
    }

    pub fn device_type(&self) -> Option<DeviceType> {
        DeviceType::from_raw(self.info.device_type)
    }

    pub fn is_camera(&self) -> bool {
        self.device_type().map_or(false, DeviceType::is_camera)
    }

    pub fn is_station(&self) -> bool {
        self.device_type().map_or(false, DeviceType::is_station)
    }

    pub fn is_doorbell(&self) -> bool {
        self.device_type().map_or(false, DeviceType::is_doorbell)
    }

    pub fn is_sensor(&self) -> bool {
        self.device_type().map_or(false, DeviceType::is_sensor)
    }

    pub fn params(&self) -> Params {
        Params::from_rows(&self.info.params)
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Upload new parameter values, then refresh the registries.
    pub async fn set_params(&self, params: &[(ParamType, Value)]) -> Result<(), CloudError> {
        self.api
            .upload_devs_params(self.serial(), self.station_serial(), params)
            .await?;
        self.api.update_device_info().await
    }

    pub async fn start_detection(&self) -> Result<(), CloudError> {
        self.set_params(&[(ParamType::DetectSwitch, Value::from(1))]).await
    }

    pub async fn stop_detection(&self) -> Result<(), CloudError> {
        self.set_params(&[(ParamType::DetectSwitch, Value::from(0))]).await
    }

    /// Ask the cloud to start an RTSP relay for this device.
    pub async fn start_stream(&self) -> Result<String, CloudError> {
        self.api.start_stream(self.serial(), self.station_serial()).await
    }

    pub async fn stop_stream(&self) -> Result<(), CloudError> {
        self.api.stop_stream(self.serial(), self.station_serial()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_follows_the_vendor_table() {
        assert!(DeviceType::Camera2.is_camera());
        assert!(DeviceType::Floodlight.is_camera());
        assert!(DeviceType::Floodlight.is_station());
        assert!(DeviceType::Doorbell.is_camera());
        assert!(DeviceType::Doorbell.is_doorbell());
        assert!(DeviceType::Doorbell.is_station());
        assert!(!DeviceType::BatteryDoorbell.is_station());
        assert!(DeviceType::MotionSensor.is_sensor());
        assert!(!DeviceType::MotionSensor.is_camera());
        assert!(DeviceType::Station.is_station());
        assert!(!DeviceType::Station.is_camera());
        assert!(!DeviceType::Keypad.is_camera());
    }

    #[test]
    fn unknown_device_type_maps_to_none() {
        assert_eq!(DeviceType::from_raw(9), Some(DeviceType::Camera2));
        assert_eq!(DeviceType::from_raw(999), None);
    }

    #[test]
    fn device_record_parses_with_missing_fields() {
        let info: DeviceInfo = serde_json::from_str(
            r#"{
                "device_sn": "T8111H1234567890",
                "device_name": "Driveway",
                "device_model": "T8111",
                "device_type": 9,
                "station_sn": "T8010P1234567890",
                "main_sw_version": "1.9.3",
                "params": [{"param_type": 2003, "param_value": "80"}]
            }"#,
        )
        .unwrap();
        assert_eq!(info.device_sn, "T8111H1234567890");
        assert_eq!(info.wifi_mac, "");
        assert_eq!(DeviceType::from_raw(info.device_type), Some(DeviceType::Camera2));
        let params = Params::from_rows(&info.params);
        assert_eq!(params.value_of(ParamType::Volume), Some(serde_json::json!(80)));
    }
}
