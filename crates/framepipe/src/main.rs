mod caps;
mod exit;
mod logging;

use clap::{Parser, ValueEnum};
use framepipe_channel::StdioChannel;
use framepipe_worker::{Capability, Worker};

use crate::logging::{init_logging, LogFormat, LogLevel};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CapabilityKind {
    /// Log each frame's dimensions.
    Dims,
    /// Background-subtraction motion detection.
    Motion,
}

#[derive(Parser, Debug)]
#[command(
    name = "framepipe",
    version,
    about = "Video analysis worker speaking the framepipe protocol on stdin/stdout"
)]
struct Cli {
    /// Analysis capability to run.
    #[arg(long, value_name = "CAPABILITY", default_value = "dims")]
    capability: CapabilityKind,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let mut capability: Box<dyn Capability> = match cli.capability {
        CapabilityKind::Dims => Box::new(caps::FrameDims),
        CapabilityKind::Motion => Box::new(caps::MotionDetector::default()),
    };

    let mut worker = Worker::new(StdioChannel::stdio());
    match worker.run(capability.as_mut()) {
        Ok(()) => std::process::exit(exit::SUCCESS),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(exit::worker_error_code(&err));
        }
    }
}
