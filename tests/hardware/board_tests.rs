use super::{test_port, test_settings};
use bootlink::config::{BootConfig, CommandConfig, Config};
use bootlink::controller::{Controller, Phase};
use bootlink::link::{BootValidator, CommandExchanger, LineReader};
use bootlink::port::{SerialPortAdapter, SyncSerialPort, SystemPorts};
use std::time::Duration;

#[tokio::test]
#[ignore]
async fn test_real_board_boot_banner() {
    let Some(port_name) = test_port() else {
        println!("No test port available; skipping");
        return;
    };

    let mut port = SyncSerialPort::open(&port_name, test_settings()).expect("open test port");
    tokio::time::sleep(BootConfig::default().settle()).await;

    let validator = BootValidator::new(&BootConfig::default(), LineReader::default());
    let outcome = validator.validate_boot(&mut port).await.expect("read banner");
    assert!(outcome.is_healthy(), "banner incomplete: {:?}", outcome);
}

#[tokio::test]
#[ignore]
async fn test_real_board_accepts_commands() {
    let Some(port_name) = test_port() else {
        println!("No test port available; skipping");
        return;
    };

    let mut port = SyncSerialPort::open(&port_name, test_settings()).expect("open test port");
    tokio::time::sleep(Duration::from_secs(2)).await;

    let config = CommandConfig::default();
    let exchanger = CommandExchanger::new(&config, LineReader::default());
    for command in [&config.activate, &config.deactivate] {
        let reply = exchanger
            .send_command(&mut port, command)
            .await
            .expect("exchange");
        println!("{} -> {:?}", command, reply);
    }
    assert!(port.bytes_to_read().is_ok());
}

#[tokio::test]
#[ignore]
async fn test_real_board_reaches_steady_state() {
    if test_port().is_none() {
        println!("No test port available; skipping");
        return;
    }

    let mut controller = Controller::new(&Config::default(), SystemPorts);
    let mut phase = controller.phase();
    for _ in 0..4 {
        phase = controller.step().await;
        if phase == Phase::Steady {
            break;
        }
    }
    controller.shutdown();
    assert_eq!(phase, Phase::Steady);
}
