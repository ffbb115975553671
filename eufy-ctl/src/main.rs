// eufy-ctl: log in, list the account's gear, and exercise one station over
// the p2p channel by toggling its on-video watermark.

mod config;

use eufy_cloud::{Api, ParamType};
use eufy_p2p::{CommandType, SessionOptions, RENDEZVOUS_PORT};

const VERSION: &str = env!("CARGO_PKG_VERSION");

// CMD_SET_DEVS_OSD values.
const WATERMARK_SHOW: u8 = 2;
const WATERMARK_HIDE: u8 = 1;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    for arg in std::env::args().skip(1) {
        if arg == "--version" || arg == "-V" {
            println!("eufy-ctl {}", VERSION);
            return Ok(());
        }
    }

    env_logger::init();
    let cfg = config::load();
    if cfg.email.is_empty() || cfg.password.is_empty() {
        return Err("set EUFY_EMAIL and EUFY_PASSWORD (or the config file) first".into());
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(cfg))
}

async fn run(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let api = Api::login(&cfg.email, &cfg.password).await?;

    let stations = api.stations().await;
    println!("stations:");
    for station in &stations {
        println!(
            "  {} {} ({})",
            station.serial(),
            station.name(),
            station.model()
        );
    }
    println!("devices:");
    for device in api.devices().await {
        let kind = device
            .device_type()
            .map(|t| format!("{:?}", t))
            .unwrap_or_else(|| "unknown".to_string());
        println!("  {} {} ({})", device.serial(), device.name(), kind);
    }

    let station = match &cfg.station {
        Some(serial) => match stations.into_iter().find(|s| s.serial() == serial.as_str()) {
            Some(station) => station,
            None => return Err(format!("station {} is not on this account", serial).into()),
        },
        None => match stations.into_iter().next() {
            Some(station) => station,
            None => return Err("this account has no stations".into()),
        },
    };
    if let Some(mode) = station.params().value_of(ParamType::GuardMode) {
        println!("{} guard mode parameter: {}", station.serial(), mode);
    }

    let mut options = SessionOptions::default();
    if let Some(addr) = &cfg.station_addr {
        options.local_hint = Some(parse_station_addr(addr)?);
    }

    println!("connecting to {} over p2p", station.serial());
    let mut session = station.connect(options).await?;
    println!("connected; showing the on-video watermark for a few seconds");
    session
        .send_command_with_int_string(0, CommandType::CmdSetDevsOsd, WATERMARK_SHOW)
        .await?;

    tokio::select! {
        _ = tokio::time::sleep(std::time::Duration::from_secs(10)) => {}
        _ = shutdown_signal() => {}
    }

    session
        .send_command_with_int_string(0, CommandType::CmdSetDevsOsd, WATERMARK_HIDE)
        .await?;
    session.close().await;
    println!("done");
    Ok(())
}

fn parse_station_addr(raw: &str) -> Result<std::net::SocketAddr, Box<dyn std::error::Error>> {
    if let Ok(addr) = raw.parse::<std::net::SocketAddr>() {
        return Ok(addr);
    }
    let ip: std::net::IpAddr = raw.parse()?;
    Ok(std::net::SocketAddr::from((ip, RENDEZVOUS_PORT)))
}

/// Wait for Ctrl+C or SIGTERM (Unix).
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
