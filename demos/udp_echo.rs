//! UDP echo server on a TAP device.
//!
//! Run as root, then from the host: `nc -u 192.168.163.103 7`.

use std::io;
use std::net::Ipv4Addr;
use std::process::Command;

use tiny_netstack::{Config, Interface, TapDevice};

const TAP_NAME: &str = "tap0";
const HOST_SIDE_CIDR: &str = "192.168.163.1/24";
const ECHO_PORT: u16 = 7;

fn run_ip(args: &[&str]) -> io::Result<()> {
    let status = Command::new("ip").args(args).status()?;
    if !status.success() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("`ip {}` failed", args.join(" ")),
        ));
    }
    Ok(())
}

fn configure_interface(name: &str, cidr: &str) -> io::Result<()> {
    run_ip(&["addr", "add", cidr, "dev", name])?;
    run_ip(&["link", "set", "up", "dev", name])?;
    println!("Interface {} configured with IP {} and brought up", name, cidr);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let device = TapDevice::open(TAP_NAME)?;
    configure_interface(device.name(), HOST_SIDE_CIDR)?;

    let config = Config::default();
    println!("Stack answering as {} ({})", config.ip, config.mac);

    let mut iface = Interface::new(config, device)?;
    iface.udp_open(ECHO_PORT, |payload: &[u8], src_ip: Ipv4Addr, src_port: u16| {
        println!("{} bytes from {}:{}", payload.len(), src_ip, src_port);
        Some(payload.to_vec())
    })?;
    println!("Echoing UDP on port {}", ECHO_PORT);

    loop {
        if let Err(e) = iface.poll() {
            eprintln!("poll failed: {}", e);
        }
    }
}
