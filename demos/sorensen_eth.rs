use std::env;

use inquire::{Select, Text};
use sorensen_psu::{
    config::PsuConfig,
    link::TcpLink,
    psu::SorensenPsu,
    transport::{SocketTransport, WebTransport},
    types::TransportKind,
};
use strum::IntoEnumIterator;

// Configuration constants - adjust these for your setup
const DEFAULT_PSU_IP: &str = "10.236.76.92";
const OUTPUT_CHANNEL: u8 = 1;

fn main() {
    env_logger::init();

    // Get PSU address from command line arg or interactive prompt
    let host = env::args().nth(1).unwrap_or_else(|| {
        Text::new("PSU IP address:")
            .with_default(DEFAULT_PSU_IP)
            .prompt()
            .expect("Failed to read address")
    });

    let kinds: Vec<TransportKind> = TransportKind::iter().collect();
    let kind = Select::new("Select a transport:", kinds)
        .prompt()
        .expect("Failed to select transport");

    let config = PsuConfig::new(host).with_transport(kind);
    println!("Using {} transport to {}", kind, config.host);

    match kind {
        TransportKind::Socket => {
            println!("Socket Interface Demo..");
            let mut socket: SocketTransport<TcpLink> =
                SocketTransport::connect(&config).expect("Failed to connect");
            println!("{}", socket.query("*IDN?", None).expect("Query failed"));
            socket.write("OP1 0").expect("Write failed");
            println!("{}", socket.query("V1?", None).expect("Query failed"));
            socket.close();
        }
        TransportKind::Web => {
            println!("Web Interface Demo..");
            let web = WebTransport::new(&config);
            web.instrument_write("OP1 0").expect("Write failed");
            println!("{}", web.instrument_query("OP1?").expect("Query failed"));
            println!("{}", web.instrument_query("V1?").expect("Query failed"));
        }
    }

    // The same sequence through the transport-agnostic PSU API
    let mut psu = SorensenPsu::connect(&config).expect("Failed to connect");
    println!("Identity: {}", psu.identify().expect("Query failed"));

    psu.channel_off(OUTPUT_CHANNEL).unwrap();
    println!(
        "Channel {} state: {:?}",
        OUTPUT_CHANNEL,
        psu.get_channel_state(OUTPUT_CHANNEL).unwrap()
    );
    println!(
        "Voltage set point: {:.3}V",
        psu.get_voltage_set(OUTPUT_CHANNEL).unwrap()
    );
    println!(
        "OVP limit: {:.3}V, OCP limit: {:.3}A",
        psu.get_ovp_limit(OUTPUT_CHANNEL).unwrap(),
        psu.get_ocp_limit(OUTPUT_CHANNEL).unwrap()
    );

    // Flash the display so the unit can be found on the bench
    psu.set_identify_flashing(true).unwrap();
}
