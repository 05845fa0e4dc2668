use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Sender;
use dotenv::dotenv;
use log::{error, info, warn};
use rumqttc::{Client, Event, LastWill, MqttOptions, Packet, QoS};

use crate::config::MqttConfig;
use crate::types::AccelerationSample;

/// Subscribes to the accelerometer topic and feeds parsed samples into
/// the session channel until the shutdown flag is raised or the channel
/// disconnects. Broker credentials, when the broker wants any, come from
/// the MQTT_USER / MQTT_PASS environment variables.
pub fn run_sample_feed(
    config: MqttConfig,
    sender: Arc<Sender<AccelerationSample>>,
    shutdown_signal: Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let mut mqtt_options = MqttOptions::new(&config.client_id, &config.broker, config.port);

    if let (Ok(user), Ok(pass)) = (env::var("MQTT_USER"), env::var("MQTT_PASS")) {
        mqtt_options.set_credentials(user, pass);
    }

    let qos = qos_from_level(config.qos);
    mqtt_options
        .set_keep_alive(Duration::from_secs(config.keep_alive as u64))
        .set_last_will(LastWill::new(
            format!("{}/status", config.client_id),
            "offline",
            qos,
            false,
        ));

    let (client, mut connection) = Client::new(mqtt_options, 10);
    client.subscribe(&config.topic, qos)?;
    info!(
        "Sample feed connected to {}:{}, topic {}",
        config.broker, config.port, config.topic
    );

    for event in connection.iter() {
        if shutdown_signal.load(Ordering::Relaxed) {
            info!("Sample feed received shutdown signal, exiting");
            break;
        }

        match event {
            Ok(Event::Incoming(Packet::Publish(publish))) if publish.topic == config.topic => {
                match parse_sample(&publish.payload) {
                    Ok(sample) => {
                        if sender.send(sample).is_err() {
                            info!("Sample channel disconnected, sample feed exiting");
                            break;
                        }
                    }
                    Err(e) => warn!("Invalid sensor payload: {}", e),
                }
            }
            Ok(Event::Incoming(_)) => {}
            Err(e) => {
                error!("MQTT connection error: {}", e);
                return Err(e.into());
            }
            _ => {}
        }
    }

    Ok(())
}

fn qos_from_level(level: u8) -> QoS {
    match level {
        0 => QoS::AtMostOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtLeastOnce,
    }
}

fn parse_sample(payload: &[u8]) -> Result<AccelerationSample, String> {
    let payload_str =
        std::str::from_utf8(payload).map_err(|e| format!("Invalid UTF-8: {}", e))?;

    serde_json::from_str::<AccelerationSample>(payload_str)
        .map_err(|e| format!("JSON parsing error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample() {
        let payload = br#"{"x": 0.12, "y": -9.81, "z": 3.5, "timestamp": 123456789}"#;
        let sample = parse_sample(payload).unwrap();
        assert_eq!(sample, AccelerationSample::new(0.12, -9.81, 3.5, 123_456_789));
    }

    #[test]
    fn test_parse_sample_rejects_garbage() {
        assert!(parse_sample(b"not json").is_err());
        assert!(parse_sample(b"{\"x\": 1.0}").is_err());
        assert!(parse_sample(&[0xff, 0xfe]).is_err());
    }
}
