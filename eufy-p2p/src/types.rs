//! Wire constant tables: message tags, payload channels, command identifiers.
//!
//! Tags come in two sets because the request and response spaces overlap:
//! 0xF141 means CHECK_CAM on the way out but LOCAL_LOOKUP_RESP on the way in.

/// Message types this client sends. The first tag byte is always 0xF1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundTag {
    Stun,
    Lookup,
    LookupWithKey,
    LocalLookup,
    Ping,
    Pong,
    CheckCam,
    Data,
    Ack,
    End,
}

impl OutboundTag {
    pub fn bytes(self) -> [u8; 2] {
        match self {
            OutboundTag::Stun => [0xF1, 0x00],
            OutboundTag::Lookup => [0xF1, 0x20],
            OutboundTag::LookupWithKey => [0xF1, 0x26],
            OutboundTag::LocalLookup => [0xF1, 0x30],
            OutboundTag::Ping => [0xF1, 0xE0],
            OutboundTag::Pong => [0xF1, 0xE1],
            OutboundTag::CheckCam => [0xF1, 0x41],
            OutboundTag::Data => [0xF1, 0xD0],
            OutboundTag::Ack => [0xF1, 0xD1],
            OutboundTag::End => [0xF1, 0xF0],
        }
    }
}

/// Message types a station or rendezvous server sends back.
/// Tags outside the known set decode to `Unknown` rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundTag {
    Stun,
    LookupResp,
    LookupAddr,
    LocalLookupResp,
    End,
    Pong,
    Ping,
    CamId,
    Ack,
    Data,
    Unknown([u8; 2]),
}

impl InboundTag {
    pub fn from_bytes(raw: [u8; 2]) -> InboundTag {
        match raw {
            [0xF1, 0x01] => InboundTag::Stun,
            [0xF1, 0x21] => InboundTag::LookupResp,
            [0xF1, 0x40] => InboundTag::LookupAddr,
            [0xF1, 0x41] => InboundTag::LocalLookupResp,
            [0xF1, 0xF0] => InboundTag::End,
            [0xF1, 0xE1] => InboundTag::Pong,
            [0xF1, 0xE0] => InboundTag::Ping,
            [0xF1, 0x42] => InboundTag::CamId,
            [0xF1, 0xD1] => InboundTag::Ack,
            [0xF1, 0xD0] => InboundTag::Data,
            other => InboundTag::Unknown(other),
        }
    }

    pub fn bytes(self) -> [u8; 2] {
        match self {
            InboundTag::Stun => [0xF1, 0x01],
            InboundTag::LookupResp => [0xF1, 0x21],
            InboundTag::LookupAddr => [0xF1, 0x40],
            InboundTag::LocalLookupResp => [0xF1, 0x41],
            InboundTag::End => [0xF1, 0xF0],
            InboundTag::Pong => [0xF1, 0xE1],
            InboundTag::Ping => [0xF1, 0xE0],
            InboundTag::CamId => [0xF1, 0x42],
            InboundTag::Ack => [0xF1, 0xD1],
            InboundTag::Data => [0xF1, 0xD0],
            InboundTag::Unknown(raw) => raw,
        }
    }
}

/// Payload channel carried in the first two bytes of DATA and ACK payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Data,
    Video,
    Control,
}

impl DataType {
    pub const ALL: [DataType; 3] = [DataType::Data, DataType::Video, DataType::Control];

    pub fn bytes(self) -> [u8; 2] {
        match self {
            DataType::Data => [0xD1, 0x00],
            DataType::Video => [0xD1, 0x01],
            DataType::Control => [0xD1, 0x02],
        }
    }

    pub fn from_bytes(raw: [u8; 2]) -> Option<DataType> {
        match raw {
            [0xD1, 0x00] => Some(DataType::Data),
            [0xD1, 0x01] => Some(DataType::Video),
            [0xD1, 0x02] => Some(DataType::Control),
            _ => None,
        }
    }
}

/// Command identifiers carried little-endian inside DATA envelopes.
/// Table lifted from the vendor app; most entries exist only so inbound
/// traffic can be named rather than dropped as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CommandType {
    ArmDelayAway = 1158,
    ArmDelayCus1 = 1159,
    ArmDelayCus2 = 1160,
    ArmDelayCus3 = 1161,
    ArmDelayHome = 1157,
    AutomationData = 1278,
    AutomationIdList = 1165,
    CmdAlarmDelayAway = 1167,
    CmdAlarmDelayCustom1 = 1168,
    CmdAlarmDelayCustom2 = 1169,
    CmdAlarmDelayCustom3 = 1170,
    CmdAlarmDelayHome = 1166,
    CmdAuddecSwitch = 1017,
    CmdAudioFrame = 1301,
    CmdBatchRecord = 1049,
    CmdBatDoorbellChimeSwitch = 1702,
    CmdBatDoorbellMechanicalChimeSwitch = 1703,
    CmdBatDoorbellQuickResponse = 1706,
    CmdBatDoorbellSetElectronicRingtoneTime = 1709,
    CmdBatDoorbellSetLedEnable = 1716,
    CmdBatDoorbellSetNotificationMode = 1710,
    CmdBatDoorbellSetRingtoneVolume = 1708,
    CmdBatDoorbellUpdateQuickResponse = 1707,
    CmdBatDoorbellVideoQuality = 1705,
    CmdBatDoorbellWdrSwitch = 1704,
    CmdBindBroadcast = 1000,
    CmdBindSyncAccountInfo = 1001,
    CmdBindSyncAccountInfoEx = 1054,
    CmdCameraInfo = 1103,
    CmdChangePwd = 1030,
    CmdChangeWifiPwd = 1031,
    CmdCloseAuddec = 1018,
    CmdCloseDevLed = 1046,
    CmdCloseEas = 1016,
    CmdCloseIrcut = 1014,
    CmdClosePir = 1012,
    CmdCollectRecord = 1047,
    CmdConvertMp4Ok = 1303,
    CmdDecollectRecord = 1048,
    CmdDelleteRecord = 1027,
    CmdDelFacePhoto = 1234,
    CmdDelUserPhoto = 1232,
    CmdDevsBindBroadcase = 1038,
    CmdDevsBindNotify = 1039,
    CmdDevsLock = 1019,
    CmdDevsSwitch = 1035,
    CmdDevsToFactory = 1037,
    CmdDevsUnbind = 1040,
    CmdDevsUnlock = 1020,
    CmdDevLedSwitch = 1045,
    CmdDevPushmsgMode = 1252,
    CmdDevRecordAutostop = 1251,
    CmdDevRecordInterval = 1250,
    CmdDevRecordTimeout = 1249,
    CmdDoenloadFinish = 1304,
    CmdDoorbellNotifyPayload = 1701,
    CmdDoorbellSetPayload = 1700,
    CmdDoorSensorAlarmEnable = 1506,
    CmdDoorSensorDoorEvt = 1503,
    CmdDoorSensorEnableLed = 1505,
    CmdDoorSensorGetDoorState = 1502,
    CmdDoorSensorGetInfo = 1501,
    CmdDoorSensorInfoReport = 1500,
    CmdDoorSensorLowPowerReport = 1504,
    CmdDownloadCancel = 1051,
    CmdDownloadVideo = 1024,
    CmdEasSwitch = 1015,
    CmdEntrySensorBatState = 1552,
    CmdEntrySensorChangeTime = 1551,
    CmdEntrySensorStatus = 1550,
    CmdFloodlightBroadcast = 902,
    CmdFormatSd = 1029,
    CmdFormatSdProgress = 1053,
    CmdGatewayinfo = 1100,
    CmdGeoAddUserInfo = 1259,
    CmdGeoDelUserInfo = 1261,
    CmdGeoSetUserStatus = 1258,
    CmdGeoUpdateLocSetting = 1262,
    CmdGeoUpdateUserInfo = 1260,
    CmdGetAdminPwd = 1122,
    CmdGetAlarmMode = 1151,
    CmdGetArmingInfo = 1107,
    CmdGetArmingStatus = 1108,
    CmdGetAuddecInfo = 1109,
    CmdGetAuddecSensitivity = 1110,
    CmdGetAuddeCstatus = 1111,
    CmdGetAwayAction = 1239,
    CmdGetBattery = 1101,
    CmdGetBatteryTemp = 1138,
    CmdGetCameraLock = 1119,
    CmdGetChargeStatus = 1136,
    CmdGetCustom1Action = 1148,
    CmdGetCustom2Action = 1149,
    CmdGetCustom3Action = 1150,
    CmdGetDelayAlarm = 1164,
    CmdGetDevicePing = 1152,
    CmdGetDevsName = 1129,
    CmdGetDevsRssiList = 1274,
    CmdGetDevStatus = 1131,
    CmdGetDevToneInfo = 1127,
    CmdGetDevUpgrade = 1134,
    CmdGetEasStatus = 1118,
    CmdGetExceptionLog = 1124,
    CmdGetFloodlightWifiList = 1405,
    CmdGetGatewayLock = 1120,
    CmdGetHomeAction = 1225,
    CmdGetHubLanIp = 1176,
    CmdGetHubLog = 1132,
    CmdGetHubLogig = 1140,
    CmdGetHubName = 1128,
    CmdGetHubPowwerSupply = 1137,
    CmdGetHubToneInfo = 1126,
    CmdGetHubUpgrade = 1133,
    CmdGetIrcutsensitivity = 1114,
    CmdGetIrmode = 1113,
    CmdGetMdetectParam = 1105,
    CmdGetMirrormode = 1112,
    CmdGetNewvesion = 1125,
    CmdGetOffAction = 1177,
    CmdGetP2pConnStatus = 1130,
    CmdGetPirctrl = 1116,
    CmdGetPirinfo = 1115,
    CmdGetPirsensitivity = 1117,
    CmdGetRecordTime = 1104,
    CmdGetRepeaterConnTestResult = 1270,
    CmdGetRepeaterRssi = 1266,
    CmdGetRepeaterSiteList = 1263,
    CmdGetStartHomekit = 1163,
    CmdGetSub1gRssi = 1141,
    CmdGetTfcardFormatStatus = 1143,
    CmdGetTfcardRepairStatus = 1153,
    CmdGetTfcardStatus = 1135,
    CmdGetUpdateStatus = 1121,
    CmdGetUpgradeResult = 1043,
    CmdGetWanLinkStatus = 1268,
    CmdGetWanMode = 1265,
    CmdGetWifiPwd = 1123,
    CmdGetWifiRssi = 1142,
    CmdHubAlarmTone = 1281,
    CmdHubClearEmmcVolume = 1800,
    CmdHubNotifyAlarm = 1282,
    CmdHubNotifyMode = 1283,
    CmdHubReboot = 1034,
    CmdHubToFactory = 1036,
    CmdIrcutSwitch = 1013,
    CmdKeypadBatteryCapState = 1653,
    CmdKeypadBatteryChargerState = 1655,
    CmdKeypadBatteryTempState = 1654,
    CmdKeypadGetPassword = 1657,
    CmdKeypadGetPasswordList = 1662,
    CmdKeypadIsPswSet = 1670,
    CmdKeypadPswOpen = 1664,
    CmdKeypadSetCustomMap = 1660,
    CmdKeypadSetPassword = 1650,
    CmdLeavingDelayAway = 1172,
    CmdLeavingDelayCustom1 = 1173,
    CmdLeavingDelayCustom2 = 1174,
    CmdLeavingDelayCustom3 = 1175,
    CmdLeavingDelayHome = 1171,
    CmdLiveviewLedSwitch = 1056,
    CmdMdetectinfo = 1106,
    CmdMotionSensorBatState = 1601,
    CmdMotionSensorEnableLed = 1607,
    CmdMotionSensorEnterUserTestMode = 1613,
    CmdMotionSensorExitUserTestMode = 1610,
    CmdMotionSensorPirEvt = 1605,
    CmdMotionSensorSetChirpTone = 1611,
    CmdMotionSensorSetPirSensitivity = 1609,
    CmdMotionSensorWorkMode = 1612,
    CmdNasSwitch = 1145,
    CmdNasTest = 1146,
    CmdNotifyPayload = 1351,
    CmdP2pDisconnect = 1044,
    CmdPing = 1139,
    CmdPirSwitch = 1011,
    CmdRecorddateSearch = 1041,
    CmdRecordlistSearch = 1042,
    CmdRecordAudioSwitch = 1366,
    CmdRecordImg = 1021,
    CmdRecordImgStop = 1022,
    CmdRecordPlayCtrl = 1026,
    CmdRecordView = 1025,
    CmdRepairProgress = 1058,
    CmdRepairSd = 1057,
    CmdRepeaterRssiTest = 1269,
    CmdSdinfo = 1102,
    CmdSdinfoEx = 1144,
    CmdSensorSetChirpTone = 1507,
    CmdSensorSetChirpVolume = 1508,
    CmdSetAiNickname = 1242,
    CmdSetAiPhoto = 1231,
    CmdSetAiSwitch = 1236,
    CmdSetAllAction = 1255,
    CmdSetArming = 1224,
    CmdSetArmingSchedule = 1211,
    CmdSetAsServer = 1237,
    CmdSetAuddecInfo = 1212,
    CmdSetAuddecSensitivity = 1213,
    CmdSetAudiosensitivity = 1227,
    CmdSetAutoDeleteRecord = 1367,
    CmdSetBitrate = 1206,
    CmdSetCustomMode = 1256,
    CmdSetDevsName = 1217,
    CmdSetDevsOsd = 1214,
    CmdSetDevsToneFile = 1202,
    CmdSetDevMdRecord = 1273,
    CmdSetDevMicMute = 1240,
    CmdSetDevMicVolume = 1229,
    CmdSetDevSpeakerMute = 1241,
    CmdSetDevSpeakerVolume = 1230,
    CmdSetDevStorageType = 1228,
    CmdSetFloodlightBrightValue = 1401,
    CmdSetFloodlightDetectionArea = 1407,
    CmdSetFloodlightLightSchedule = 1404,
    CmdSetFloodlightManualSwitch = 1400,
    CmdSetFloodlightStreetLamp = 1402,
    CmdSetFloodlightTotalSwitch = 1403,
    CmdSetFloodlightWifiConnect = 1406,
    CmdSetGssensitivity = 1226,
    CmdSetHubAlarmAutoEnd = 1280,
    CmdSetHubAlarmClose = 1279,
    CmdSetHubAudecStatus = 1222,
    CmdSetHubGsStatus = 1220,
    CmdSetHubIrcutStatus = 1219,
    CmdSetHubMvdecStatus = 1221,
    CmdSetHubName = 1216,
    CmdSetHubOsd = 1253,
    CmdSetHubPirStatus = 1218,
    CmdSetHubSpkVolume = 1235,
    CmdSetIrmode = 1208,
    CmdSetJsonSchedule = 1254,
    CmdSetLanguage = 1200,
    CmdSetLightCtrlBrightPir = 1412,
    CmdSetLightCtrlBrightSch = 1413,
    CmdSetLightCtrlLampValue = 1410,
    CmdSetLightCtrlPirSwitch = 1408,
    CmdSetLightCtrlPirTime = 1409,
    CmdSetLightCtrlSunriseInfo = 1415,
    CmdSetLightCtrlSunriseSwitch = 1414,
    CmdSetLightCtrlTrigger = 1411,
    CmdSetMdetectparam = 1204,
    CmdSetMdsensitivity = 1272,
    CmdSetMirrormode = 1207,
    CmdSetMotionSensitivity = 1276,
    CmdSetNightVisionType = 1277,
    CmdSetNotfacePushmsg = 1248,
    CmdSetPayload = 1350,
    CmdSetPirsensitivity = 1210,
    CmdSetPirInfo = 1209,
    CmdSetPirPowermode = 1246,
    CmdSetPirTestMode = 1243,
    CmdSetPriAction = 1233,
    CmdSetRecordtime = 1203,
    CmdSetRepeaterParams = 1264,
    CmdSetResolution = 1205,
    CmdSetScheduleDefault = 1257,
    CmdSetSnoozeMode = 1271,
    CmdSetStorgeType = 1223,
    CmdSetTelnet = 1247,
    CmdSetTimezone = 1215,
    CmdSetToneFile = 1201,
    CmdSetUpgrade = 1238,
    CmdSnapshot = 1028,
    CmdStartRealtimeMedia = 1003,
    CmdStartRecord = 1009,
    CmdStartRecBroadcase = 900,
    CmdStartTalkback = 1005,
    CmdStartVoicecall = 1007,
    CmdStopRealtimeMedia = 1004,
    CmdStopRecord = 1010,
    CmdStopRecBroadcase = 901,
    CmdStopShare = 1023,
    CmdStopTalkback = 1006,
    CmdStopVoicecall = 1008,
    CmdStreamMsg = 1302,
    CmdStressTestOper = 1050,
    CmdTimeSycn = 1033,
    CmdUnbindAccount = 1002,
    CmdVideoFrame = 1300,
    CmdWifiConfig = 1032,
}

impl CommandType {
    pub fn raw(self) -> u16 {
        self as u16
    }

    pub fn from_raw(raw: u16) -> Option<CommandType> {
        match raw {
            1158 => Some(CommandType::ArmDelayAway),
            1159 => Some(CommandType::ArmDelayCus1),
            1160 => Some(CommandType::ArmDelayCus2),
            1161 => Some(CommandType::ArmDelayCus3),
            1157 => Some(CommandType::ArmDelayHome),
            1278 => Some(CommandType::AutomationData),
            1165 => Some(CommandType::AutomationIdList),
            1167 => Some(CommandType::CmdAlarmDelayAway),
            1168 => Some(CommandType::CmdAlarmDelayCustom1),
            1169 => Some(CommandType::CmdAlarmDelayCustom2),
            1170 => Some(CommandType::CmdAlarmDelayCustom3),
            1166 => Some(CommandType::CmdAlarmDelayHome),
            1017 => Some(CommandType::CmdAuddecSwitch),
            1301 => Some(CommandType::CmdAudioFrame),
            1049 => Some(CommandType::CmdBatchRecord),
            1702 => Some(CommandType::CmdBatDoorbellChimeSwitch),
            1703 => Some(CommandType::CmdBatDoorbellMechanicalChimeSwitch),
            1706 => Some(CommandType::CmdBatDoorbellQuickResponse),
            1709 => Some(CommandType::CmdBatDoorbellSetElectronicRingtoneTime),
            1716 => Some(CommandType::CmdBatDoorbellSetLedEnable),
            1710 => Some(CommandType::CmdBatDoorbellSetNotificationMode),
            1708 => Some(CommandType::CmdBatDoorbellSetRingtoneVolume),
            1707 => Some(CommandType::CmdBatDoorbellUpdateQuickResponse),
            1705 => Some(CommandType::CmdBatDoorbellVideoQuality),
            1704 => Some(CommandType::CmdBatDoorbellWdrSwitch),
            1000 => Some(CommandType::CmdBindBroadcast),
            1001 => Some(CommandType::CmdBindSyncAccountInfo),
            1054 => Some(CommandType::CmdBindSyncAccountInfoEx),
            1103 => Some(CommandType::CmdCameraInfo),
            1030 => Some(CommandType::CmdChangePwd),
            1031 => Some(CommandType::CmdChangeWifiPwd),
            1018 => Some(CommandType::CmdCloseAuddec),
            1046 => Some(CommandType::CmdCloseDevLed),
            1016 => Some(CommandType::CmdCloseEas),
            1014 => Some(CommandType::CmdCloseIrcut),
            1012 => Some(CommandType::CmdClosePir),
            1047 => Some(CommandType::CmdCollectRecord),
            1303 => Some(CommandType::CmdConvertMp4Ok),
            1048 => Some(CommandType::CmdDecollectRecord),
            1027 => Some(CommandType::CmdDelleteRecord),
            1234 => Some(CommandType::CmdDelFacePhoto),
            1232 => Some(CommandType::CmdDelUserPhoto),
            1038 => Some(CommandType::CmdDevsBindBroadcase),
            1039 => Some(CommandType::CmdDevsBindNotify),
            1019 => Some(CommandType::CmdDevsLock),
            1035 => Some(CommandType::CmdDevsSwitch),
            1037 => Some(CommandType::CmdDevsToFactory),
            1040 => Some(CommandType::CmdDevsUnbind),
            1020 => Some(CommandType::CmdDevsUnlock),
            1045 => Some(CommandType::CmdDevLedSwitch),
            1252 => Some(CommandType::CmdDevPushmsgMode),
            1251 => Some(CommandType::CmdDevRecordAutostop),
            1250 => Some(CommandType::CmdDevRecordInterval),
            1249 => Some(CommandType::CmdDevRecordTimeout),
            1304 => Some(CommandType::CmdDoenloadFinish),
            1701 => Some(CommandType::CmdDoorbellNotifyPayload),
            1700 => Some(CommandType::CmdDoorbellSetPayload),
            1506 => Some(CommandType::CmdDoorSensorAlarmEnable),
            1503 => Some(CommandType::CmdDoorSensorDoorEvt),
            1505 => Some(CommandType::CmdDoorSensorEnableLed),
            1502 => Some(CommandType::CmdDoorSensorGetDoorState),
            1501 => Some(CommandType::CmdDoorSensorGetInfo),
            1500 => Some(CommandType::CmdDoorSensorInfoReport),
            1504 => Some(CommandType::CmdDoorSensorLowPowerReport),
            1051 => Some(CommandType::CmdDownloadCancel),
            1024 => Some(CommandType::CmdDownloadVideo),
            1015 => Some(CommandType::CmdEasSwitch),
            1552 => Some(CommandType::CmdEntrySensorBatState),
            1551 => Some(CommandType::CmdEntrySensorChangeTime),
            1550 => Some(CommandType::CmdEntrySensorStatus),
            902 => Some(CommandType::CmdFloodlightBroadcast),
            1029 => Some(CommandType::CmdFormatSd),
            1053 => Some(CommandType::CmdFormatSdProgress),
            1100 => Some(CommandType::CmdGatewayinfo),
            1259 => Some(CommandType::CmdGeoAddUserInfo),
            1261 => Some(CommandType::CmdGeoDelUserInfo),
            1258 => Some(CommandType::CmdGeoSetUserStatus),
            1262 => Some(CommandType::CmdGeoUpdateLocSetting),
            1260 => Some(CommandType::CmdGeoUpdateUserInfo),
            1122 => Some(CommandType::CmdGetAdminPwd),
            1151 => Some(CommandType::CmdGetAlarmMode),
            1107 => Some(CommandType::CmdGetArmingInfo),
            1108 => Some(CommandType::CmdGetArmingStatus),
            1109 => Some(CommandType::CmdGetAuddecInfo),
            1110 => Some(CommandType::CmdGetAuddecSensitivity),
            1111 => Some(CommandType::CmdGetAuddeCstatus),
            1239 => Some(CommandType::CmdGetAwayAction),
            1101 => Some(CommandType::CmdGetBattery),
            1138 => Some(CommandType::CmdGetBatteryTemp),
            1119 => Some(CommandType::CmdGetCameraLock),
            1136 => Some(CommandType::CmdGetChargeStatus),
            1148 => Some(CommandType::CmdGetCustom1Action),
            1149 => Some(CommandType::CmdGetCustom2Action),
            1150 => Some(CommandType::CmdGetCustom3Action),
            1164 => Some(CommandType::CmdGetDelayAlarm),
            1152 => Some(CommandType::CmdGetDevicePing),
            1129 => Some(CommandType::CmdGetDevsName),
            1274 => Some(CommandType::CmdGetDevsRssiList),
            1131 => Some(CommandType::CmdGetDevStatus),
            1127 => Some(CommandType::CmdGetDevToneInfo),
            1134 => Some(CommandType::CmdGetDevUpgrade),
            1118 => Some(CommandType::CmdGetEasStatus),
            1124 => Some(CommandType::CmdGetExceptionLog),
            1405 => Some(CommandType::CmdGetFloodlightWifiList),
            1120 => Some(CommandType::CmdGetGatewayLock),
            1225 => Some(CommandType::CmdGetHomeAction),
            1176 => Some(CommandType::CmdGetHubLanIp),
            1132 => Some(CommandType::CmdGetHubLog),
            1140 => Some(CommandType::CmdGetHubLogig),
            1128 => Some(CommandType::CmdGetHubName),
            1137 => Some(CommandType::CmdGetHubPowwerSupply),
            1126 => Some(CommandType::CmdGetHubToneInfo),
            1133 => Some(CommandType::CmdGetHubUpgrade),
            1114 => Some(CommandType::CmdGetIrcutsensitivity),
            1113 => Some(CommandType::CmdGetIrmode),
            1105 => Some(CommandType::CmdGetMdetectParam),
            1112 => Some(CommandType::CmdGetMirrormode),
            1125 => Some(CommandType::CmdGetNewvesion),
            1177 => Some(CommandType::CmdGetOffAction),
            1130 => Some(CommandType::CmdGetP2pConnStatus),
            1116 => Some(CommandType::CmdGetPirctrl),
            1115 => Some(CommandType::CmdGetPirinfo),
            1117 => Some(CommandType::CmdGetPirsensitivity),
            1104 => Some(CommandType::CmdGetRecordTime),
            1270 => Some(CommandType::CmdGetRepeaterConnTestResult),
            1266 => Some(CommandType::CmdGetRepeaterRssi),
            1263 => Some(CommandType::CmdGetRepeaterSiteList),
            1163 => Some(CommandType::CmdGetStartHomekit),
            1141 => Some(CommandType::CmdGetSub1gRssi),
            1143 => Some(CommandType::CmdGetTfcardFormatStatus),
            1153 => Some(CommandType::CmdGetTfcardRepairStatus),
            1135 => Some(CommandType::CmdGetTfcardStatus),
            1121 => Some(CommandType::CmdGetUpdateStatus),
            1043 => Some(CommandType::CmdGetUpgradeResult),
            1268 => Some(CommandType::CmdGetWanLinkStatus),
            1265 => Some(CommandType::CmdGetWanMode),
            1123 => Some(CommandType::CmdGetWifiPwd),
            1142 => Some(CommandType::CmdGetWifiRssi),
            1281 => Some(CommandType::CmdHubAlarmTone),
            1800 => Some(CommandType::CmdHubClearEmmcVolume),
            1282 => Some(CommandType::CmdHubNotifyAlarm),
            1283 => Some(CommandType::CmdHubNotifyMode),
            1034 => Some(CommandType::CmdHubReboot),
            1036 => Some(CommandType::CmdHubToFactory),
            1013 => Some(CommandType::CmdIrcutSwitch),
            1653 => Some(CommandType::CmdKeypadBatteryCapState),
            1655 => Some(CommandType::CmdKeypadBatteryChargerState),
            1654 => Some(CommandType::CmdKeypadBatteryTempState),
            1657 => Some(CommandType::CmdKeypadGetPassword),
            1662 => Some(CommandType::CmdKeypadGetPasswordList),
            1670 => Some(CommandType::CmdKeypadIsPswSet),
            1664 => Some(CommandType::CmdKeypadPswOpen),
            1660 => Some(CommandType::CmdKeypadSetCustomMap),
            1650 => Some(CommandType::CmdKeypadSetPassword),
            1172 => Some(CommandType::CmdLeavingDelayAway),
            1173 => Some(CommandType::CmdLeavingDelayCustom1),
            1174 => Some(CommandType::CmdLeavingDelayCustom2),
            1175 => Some(CommandType::CmdLeavingDelayCustom3),
            1171 => Some(CommandType::CmdLeavingDelayHome),
            1056 => Some(CommandType::CmdLiveviewLedSwitch),
            1106 => Some(CommandType::CmdMdetectinfo),
            1601 => Some(CommandType::CmdMotionSensorBatState),
            1607 => Some(CommandType::CmdMotionSensorEnableLed),
            1613 => Some(CommandType::CmdMotionSensorEnterUserTestMode),
            1610 => Some(CommandType::CmdMotionSensorExitUserTestMode),
            1605 => Some(CommandType::CmdMotionSensorPirEvt),
            1611 => Some(CommandType::CmdMotionSensorSetChirpTone),
            1609 => Some(CommandType::CmdMotionSensorSetPirSensitivity),
            1612 => Some(CommandType::CmdMotionSensorWorkMode),
            1145 => Some(CommandType::CmdNasSwitch),
            1146 => Some(CommandType::CmdNasTest),
            1351 => Some(CommandType::CmdNotifyPayload),
            1044 => Some(CommandType::CmdP2pDisconnect),
            1139 => Some(CommandType::CmdPing),
            1011 => Some(CommandType::CmdPirSwitch),
            1041 => Some(CommandType::CmdRecorddateSearch),
            1042 => Some(CommandType::CmdRecordlistSearch),
            1366 => Some(CommandType::CmdRecordAudioSwitch),
            1021 => Some(CommandType::CmdRecordImg),
            1022 => Some(CommandType::CmdRecordImgStop),
            1026 => Some(CommandType::CmdRecordPlayCtrl),
            1025 => Some(CommandType::CmdRecordView),
            1058 => Some(CommandType::CmdRepairProgress),
            1057 => Some(CommandType::CmdRepairSd),
            1269 => Some(CommandType::CmdRepeaterRssiTest),
            1102 => Some(CommandType::CmdSdinfo),
            1144 => Some(CommandType::CmdSdinfoEx),
            1507 => Some(CommandType::CmdSensorSetChirpTone),
            1508 => Some(CommandType::CmdSensorSetChirpVolume),
            1242 => Some(CommandType::CmdSetAiNickname),
            1231 => Some(CommandType::CmdSetAiPhoto),
            1236 => Some(CommandType::CmdSetAiSwitch),
            1255 => Some(CommandType::CmdSetAllAction),
            1224 => Some(CommandType::CmdSetArming),
            1211 => Some(CommandType::CmdSetArmingSchedule),
            1237 => Some(CommandType::CmdSetAsServer),
            1212 => Some(CommandType::CmdSetAuddecInfo),
            1213 => Some(CommandType::CmdSetAuddecSensitivity),
            1227 => Some(CommandType::CmdSetAudiosensitivity),
            1367 => Some(CommandType::CmdSetAutoDeleteRecord),
            1206 => Some(CommandType::CmdSetBitrate),
            1256 => Some(CommandType::CmdSetCustomMode),
            1217 => Some(CommandType::CmdSetDevsName),
            1214 => Some(CommandType::CmdSetDevsOsd),
            1202 => Some(CommandType::CmdSetDevsToneFile),
            1273 => Some(CommandType::CmdSetDevMdRecord),
            1240 => Some(CommandType::CmdSetDevMicMute),
            1229 => Some(CommandType::CmdSetDevMicVolume),
            1241 => Some(CommandType::CmdSetDevSpeakerMute),
            1230 => Some(CommandType::CmdSetDevSpeakerVolume),
            1228 => Some(CommandType::CmdSetDevStorageType),
            1401 => Some(CommandType::CmdSetFloodlightBrightValue),
            1407 => Some(CommandType::CmdSetFloodlightDetectionArea),
            1404 => Some(CommandType::CmdSetFloodlightLightSchedule),
            1400 => Some(CommandType::CmdSetFloodlightManualSwitch),
            1402 => Some(CommandType::CmdSetFloodlightStreetLamp),
            1403 => Some(CommandType::CmdSetFloodlightTotalSwitch),
            1406 => Some(CommandType::CmdSetFloodlightWifiConnect),
            1226 => Some(CommandType::CmdSetGssensitivity),
            1280 => Some(CommandType::CmdSetHubAlarmAutoEnd),
            1279 => Some(CommandType::CmdSetHubAlarmClose),
            1222 => Some(CommandType::CmdSetHubAudecStatus),
            1220 => Some(CommandType::CmdSetHubGsStatus),
            1219 => Some(CommandType::CmdSetHubIrcutStatus),
            1221 => Some(CommandType::CmdSetHubMvdecStatus),
            1216 => Some(CommandType::CmdSetHubName),
            1253 => Some(CommandType::CmdSetHubOsd),
            1218 => Some(CommandType::CmdSetHubPirStatus),
            1235 => Some(CommandType::CmdSetHubSpkVolume),
            1208 => Some(CommandType::CmdSetIrmode),
            1254 => Some(CommandType::CmdSetJsonSchedule),
            1200 => Some(CommandType::CmdSetLanguage),
            1412 => Some(CommandType::CmdSetLightCtrlBrightPir),
            1413 => Some(CommandType::CmdSetLightCtrlBrightSch),
            1410 => Some(CommandType::CmdSetLightCtrlLampValue),
            1408 => Some(CommandType::CmdSetLightCtrlPirSwitch),
            1409 => Some(CommandType::CmdSetLightCtrlPirTime),
            1415 => Some(CommandType::CmdSetLightCtrlSunriseInfo),
            1414 => Some(CommandType::CmdSetLightCtrlSunriseSwitch),
            1411 => Some(CommandType::CmdSetLightCtrlTrigger),
            1204 => Some(CommandType::CmdSetMdetectparam),
            1272 => Some(CommandType::CmdSetMdsensitivity),
            1207 => Some(CommandType::CmdSetMirrormode),
            1276 => Some(CommandType::CmdSetMotionSensitivity),
            1277 => Some(CommandType::CmdSetNightVisionType),
            1248 => Some(CommandType::CmdSetNotfacePushmsg),
            1350 => Some(CommandType::CmdSetPayload),
            1210 => Some(CommandType::CmdSetPirsensitivity),
            1209 => Some(CommandType::CmdSetPirInfo),
            1246 => Some(CommandType::CmdSetPirPowermode),
            1243 => Some(CommandType::CmdSetPirTestMode),
            1233 => Some(CommandType::CmdSetPriAction),
            1203 => Some(CommandType::CmdSetRecordtime),
            1264 => Some(CommandType::CmdSetRepeaterParams),
            1205 => Some(CommandType::CmdSetResolution),
            1257 => Some(CommandType::CmdSetScheduleDefault),
            1271 => Some(CommandType::CmdSetSnoozeMode),
            1223 => Some(CommandType::CmdSetStorgeType),
            1247 => Some(CommandType::CmdSetTelnet),
            1215 => Some(CommandType::CmdSetTimezone),
            1201 => Some(CommandType::CmdSetToneFile),
            1238 => Some(CommandType::CmdSetUpgrade),
            1028 => Some(CommandType::CmdSnapshot),
            1003 => Some(CommandType::CmdStartRealtimeMedia),
            1009 => Some(CommandType::CmdStartRecord),
            900 => Some(CommandType::CmdStartRecBroadcase),
            1005 => Some(CommandType::CmdStartTalkback),
            1007 => Some(CommandType::CmdStartVoicecall),
            1004 => Some(CommandType::CmdStopRealtimeMedia),
            1010 => Some(CommandType::CmdStopRecord),
            901 => Some(CommandType::CmdStopRecBroadcase),
            1023 => Some(CommandType::CmdStopShare),
            1006 => Some(CommandType::CmdStopTalkback),
            1008 => Some(CommandType::CmdStopVoicecall),
            1302 => Some(CommandType::CmdStreamMsg),
            1050 => Some(CommandType::CmdStressTestOper),
            1033 => Some(CommandType::CmdTimeSycn),
            1002 => Some(CommandType::CmdUnbindAccount),
            1300 => Some(CommandType::CmdVideoFrame),
            1032 => Some(CommandType::CmdWifiConfig),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_sets_overlap_at_0x41() {
        assert_eq!(OutboundTag::CheckCam.bytes(), [0xF1, 0x41]);
        assert_eq!(
            InboundTag::from_bytes([0xF1, 0x41]),
            InboundTag::LocalLookupResp
        );
    }

    #[test]
    fn inbound_roundtrip_known_and_unknown() {
        for tag in [
            InboundTag::Stun,
            InboundTag::LookupResp,
            InboundTag::LookupAddr,
            InboundTag::LocalLookupResp,
            InboundTag::End,
            InboundTag::Pong,
            InboundTag::Ping,
            InboundTag::CamId,
            InboundTag::Ack,
            InboundTag::Data,
        ] {
            assert_eq!(InboundTag::from_bytes(tag.bytes()), tag);
        }
        assert_eq!(
            InboundTag::from_bytes([0xF1, 0x77]),
            InboundTag::Unknown([0xF1, 0x77])
        );
    }

    #[test]
    fn data_type_channels() {
        for dt in DataType::ALL {
            assert_eq!(DataType::from_bytes(dt.bytes()), Some(dt));
        }
        assert_eq!(DataType::from_bytes([0xD1, 0x03]), None);
    }

    #[test]
    fn command_raw_roundtrip() {
        assert_eq!(CommandType::CmdSetDevsOsd.raw(), 1214);
        assert_eq!(CommandType::from_raw(1214), Some(CommandType::CmdSetDevsOsd));
        assert_eq!(CommandType::from_raw(1152), Some(CommandType::CmdGetDevicePing));
        assert_eq!(CommandType::from_raw(1139), Some(CommandType::CmdPing));
        assert_eq!(CommandType::from_raw(1224), Some(CommandType::CmdSetArming));
        assert_eq!(CommandType::from_raw(0), None);
        assert_eq!(CommandType::from_raw(65535), None);
    }
}
