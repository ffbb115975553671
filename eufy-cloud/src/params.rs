//! Device parameter tables and their value codecs.
//!
//! Parameters travel as JSON strings inside the cloud's device records;
//! a couple of them are additionally base64-wrapped. The identifier table
//! comes from the vendor app.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::debug;
use serde::Deserialize;
use serde_json::Value;

/// Parameter identifiers the cloud understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ParamType {
    ChimeState = 2015,
    DetectExposure = 2023,
    DetectMode = 2004,
    DetectMotionSensitive = 2005,
    DetectScenario = 2028,
    DetectSwitch = 2027,
    DetectZone = 2006,
    DoorbellAudioRecode = 2042,
    DoorbellBrightness = 2032,
    DoorbellDistortion = 2033,
    DoorbellHdr = 2029,
    DoorbellIrMode = 2030,
    DoorbellLedNightMode = 2039,
    DoorbellMotionAdvanceOption = 2041,
    DoorbellMotionNotification = 2035,
    DoorbellNotificationJumpMode = 2038,
    DoorbellNotificationOpen = 2036,
    DoorbellRecordQuality = 2034,
    DoorbellRingRecord = 2040,
    DoorbellSnoozeStartTime = 2037,
    DoorbellVideoQuality = 2031,
    NightVisual = 2002,
    OpenDevice = 2001,
    RingingVolume = 2022,
    Sdcard = 2010,
    UnDetectZone = 2007,
    Volume = 2003,

    /// Value is base64-wrapped JSON.
    SnoozeMode = 1271,
    /// 1 hides the on-video stamp, 2 shows it.
    WatermarkMode = 1214,
    DeviceUpgradeNow = 1134,
    CameraUpgradeNow = 1133,
    ScheduleMode = 1257,
    /// 0 away, 1 home, 2 schedule, 63 disarmed.
    GuardMode = 1224,

    FloodlightManualSwitch = 1400,
    /// Range 22-100.
    FloodlightManualBrightness = 1401,
    /// Range 22-100.
    FloodlightMotionBrightness = 1412,
    /// Range 22-100.
    FloodlightScheduleBrightness = 1413,
    /// Range 1-5.
    FloodlightMotionSensitivty = 1272,

    CameraSpeakerVolume = 1230,
    CameraRecordEnableAudio = 1366,
    /// In seconds.
    CameraRecordRetriggerInterval = 1250,
    /// In seconds.
    CameraRecordClipLength = 1249,

    CameraIrCut = 1013,
    CameraPir = 1011,
    CameraWifiRssi = 1142,

    /// Value is base64-wrapped JSON.
    CameraMotionZones = 1204,

    PushMsgMode = 1252,
}

impl ParamType {
    pub fn raw(self) -> u16 {
        self as u16
    }

    pub fn from_raw(raw: i64) -> Option<ParamType> {
        match raw {
            2015 => Some(ParamType::ChimeState),
            2023 => Some(ParamType::DetectExposure),
            2004 => Some(ParamType::DetectMode),
            2005 => Some(ParamType::DetectMotionSensitive),
            2028 => Some(ParamType::DetectScenario),
            2027 => Some(ParamType::DetectSwitch),
            2006 => Some(ParamType::DetectZone),
            2042 => Some(ParamType::DoorbellAudioRecode),
            2032 => Some(ParamType::DoorbellBrightness),
            2033 => Some(ParamType::DoorbellDistortion),
            2029 => Some(ParamType::DoorbellHdr),
            2030 => Some(ParamType::DoorbellIrMode),
            2039 => Some(ParamType::DoorbellLedNightMode),
            2041 => Some(ParamType::DoorbellMotionAdvanceOption),
            2035 => Some(ParamType::DoorbellMotionNotification),
            2038 => Some(ParamType::DoorbellNotificationJumpMode),
            2036 => Some(ParamType::DoorbellNotificationOpen),
            2034 => Some(ParamType::DoorbellRecordQuality),
            2040 => Some(ParamType::DoorbellRingRecord),
            2037 => Some(ParamType::DoorbellSnoozeStartTime),
            2031 => Some(ParamType::DoorbellVideoQuality),
            2002 => Some(ParamType::NightVisual),
            2001 => Some(ParamType::OpenDevice),
            2022 => Some(ParamType::RingingVolume),
            2010 => Some(ParamType::Sdcard),
            2007 => Some(ParamType::UnDetectZone),
            2003 => Some(ParamType::Volume),
            1271 => Some(ParamType::SnoozeMode),
            1214 => Some(ParamType::WatermarkMode),
            1134 => Some(ParamType::DeviceUpgradeNow),
            1133 => Some(ParamType::CameraUpgradeNow),
            1257 => Some(ParamType::ScheduleMode),
            1224 => Some(ParamType::GuardMode),
            1400 => Some(ParamType::FloodlightManualSwitch),
            1401 => Some(ParamType::FloodlightManualBrightness),
            1412 => Some(ParamType::FloodlightMotionBrightness),
            1413 => Some(ParamType::FloodlightScheduleBrightness),
            1272 => Some(ParamType::FloodlightMotionSensitivty),
            1230 => Some(ParamType::CameraSpeakerVolume),
            1366 => Some(ParamType::CameraRecordEnableAudio),
            1250 => Some(ParamType::CameraRecordRetriggerInterval),
            1249 => Some(ParamType::CameraRecordClipLength),
            1013 => Some(ParamType::CameraIrCut),
            1011 => Some(ParamType::CameraPir),
            1142 => Some(ParamType::CameraWifiRssi),
            1204 => Some(ParamType::CameraMotionZones),
            1252 => Some(ParamType::PushMsgMode),
            _ => None,
        }
    }

    /// Decode a parameter's on-wire string into JSON. Empty strings mean
    /// the parameter has no value.
    pub fn read_value(self, raw: &str) -> Result<Option<Value>, ParamError> {
        if raw.is_empty() {
            return Ok(None);
        }
        let text = if matches!(self, ParamType::SnoozeMode | ParamType::CameraMotionZones) {
            String::from_utf8(BASE64.decode(raw)?)?
        } else {
            raw.to_string()
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Encode a JSON value into the parameter's on-wire string. Only the
    /// snooze parameter is base64-wrapped on the way up.
    pub fn write_value(self, value: &Value) -> String {
        let text = value.to_string();
        if self == ParamType::SnoozeMode {
            BASE64.encode(text)
        } else {
            text
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error("parameter value is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("parameter value is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("parameter value is not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// One row of the `params` array attached to device and station records.
#[derive(Debug, Clone, Deserialize)]
pub struct ParamRow {
    pub param_type: i64,
    #[serde(default)]
    pub param_value: String,
    #[serde(default)]
    pub param_id: Option<i64>,
    #[serde(default)]
    pub status: Option<i64>,
}

/// A parameter row paired with its recognized type.
#[derive(Debug, Clone)]
pub struct Param {
    kind: ParamType,
    row: ParamRow,
}

impl Param {
    pub fn kind(&self) -> ParamType {
        self.kind
    }

    pub fn raw_value(&self) -> &str {
        &self.row.param_value
    }

    /// The decoded value, `None` when the cloud sent an empty string.
    pub fn value(&self) -> Result<Option<Value>, ParamError> {
        self.kind.read_value(&self.row.param_value)
    }

    pub fn id(&self) -> Option<i64> {
        self.row.param_id
    }

    pub fn status(&self) -> Option<i64> {
        self.row.status
    }
}

/// All recognized parameters of one device or station.
#[derive(Debug, Clone, Default)]
pub struct Params(Vec<Param>);

impl Params {
    /// Keep rows whose type is in the table; log and drop the rest.
    pub fn from_rows(rows: &[ParamRow]) -> Params {
        let mut params = Vec::new();
        for row in rows {
            match ParamType::from_raw(row.param_type) {
                Some(kind) => params.push(Param {
                    kind,
                    row: row.clone(),
                }),
                None => debug!(
                    "skipping unrecognized parameter {} (value {:?})",
                    row.param_type, row.param_value
                ),
            }
        }
        Params(params)
    }

    pub fn get(&self, kind: ParamType) -> Option<&Param> {
        self.0.iter().find(|p| p.kind == kind)
    }

    /// Decoded value for `kind`, when present and readable.
    pub fn value_of(&self, kind: ParamType) -> Option<Value> {
        self.get(kind).and_then(|p| p.value().ok()).flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_params_are_bare_json() {
        let value = ParamType::Volume.read_value("23").unwrap().unwrap();
        assert_eq!(value, json!(23));
        assert_eq!(ParamType::Volume.write_value(&json!(23)), "23");
    }

    #[test]
    fn empty_value_reads_as_none() {
        assert!(ParamType::Volume.read_value("").unwrap().is_none());
    }

    #[test]
    fn snooze_mode_is_base64_both_ways() {
        let value = json!({"account_id": "abc", "snooze_time": 120});
        let wire = ParamType::SnoozeMode.write_value(&value);
        assert_ne!(wire, value.to_string());
        let back = ParamType::SnoozeMode.read_value(&wire).unwrap().unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn motion_zones_decode_base64_but_upload_plain() {
        let value = json!({"polygens": []});
        let wire = BASE64.encode(value.to_string());
        let back = ParamType::CameraMotionZones.read_value(&wire).unwrap().unwrap();
        assert_eq!(back, value);
        // Uploads are plain JSON for this parameter.
        assert_eq!(ParamType::CameraMotionZones.write_value(&value), value.to_string());
    }

    #[test]
    fn broken_base64_is_an_error() {
        assert!(matches!(
            ParamType::SnoozeMode.read_value("!!not-base64!!"),
            Err(ParamError::Base64(_))
        ));
    }

    #[test]
    fn raw_identifiers_round_trip() {
        for kind in [
            ParamType::ChimeState,
            ParamType::SnoozeMode,
            ParamType::GuardMode,
            ParamType::CameraMotionZones,
            ParamType::PushMsgMode,
        ] {
            assert_eq!(ParamType::from_raw(kind.raw() as i64), Some(kind));
        }
        assert_eq!(ParamType::from_raw(10000), None);
    }

    #[test]
    fn unknown_rows_are_dropped() {
        let rows = vec![
            ParamRow {
                param_type: 2003,
                param_value: "5".to_string(),
                param_id: Some(77),
                status: Some(1),
            },
            ParamRow {
                param_type: 10000,
                param_value: "opaque".to_string(),
                param_id: None,
                status: None,
            },
        ];
        let params = Params::from_rows(&rows);
        assert_eq!(params.len(), 1);
        assert_eq!(params.value_of(ParamType::Volume), Some(json!(5)));
        assert!(params.get(ParamType::GuardMode).is_none());
    }
}
