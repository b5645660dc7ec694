//! Audio device listing command.

use clap::{Args, Subcommand};
use mutewatch_io::{AudioDevice, default_device, list_devices};

#[derive(Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    command: Option<DevicesCommand>,
}

#[derive(Subcommand)]
enum DevicesCommand {
    /// List all available audio devices
    List,

    /// Show default device information
    Info,
}

pub fn run(args: DevicesArgs) -> anyhow::Result<()> {
    match args.command.unwrap_or(DevicesCommand::List) {
        DevicesCommand::List => {
            let devices = list_devices()?;

            if devices.is_empty() {
                println!("No audio devices found.");
                return Ok(());
            }

            println!("Available Audio Devices");
            println!("=======================\n");

            print_section("Input Devices (monitored microphone):", &devices.inputs);
            print_section("Output Devices (audible cue):", &devices.outputs);

            println!("* used when no device is named");
            println!(
                "Total: {} input(s), {} output(s)",
                devices.inputs.len(),
                devices.outputs.len()
            );
            println!();
            println!("Tip: Use device index or partial name with --input/--output:");
            println!("  mutewatch watch --input 0");
            println!("  mutewatch watch --input \"USB\" --output \"Headphones\"");
        }

        DevicesCommand::Info => {
            let (input, output) = default_device()?;

            println!("Default Audio Devices");
            println!("=====================\n");

            match input {
                Some(device) => println!("Monitored input: {}", device.summary()),
                None => println!("Monitored input: None"),
            }
            match output {
                Some(device) => println!("Cue output:      {}", device.summary()),
                None => println!("Cue output:      None"),
            }
        }
    }

    Ok(())
}

fn print_section(title: &str, devices: &[AudioDevice]) {
    if devices.is_empty() {
        return;
    }
    println!("{title}");
    for (idx, device) in devices.iter().enumerate() {
        let marker = if device.is_default { '*' } else { ' ' };
        println!(" {marker}[{idx}] {}", device.summary());
    }
    println!();
}
