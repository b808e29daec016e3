//! Resolve the driver parameters the way the node would and print them.
//!
//! ```text
//! bno055_params --node-name bno055 --ros-args --params-file bno055_params.yaml -p uart_baudrate:=57600
//! ```

use bno055::prelude::*;
use bno055::logging::init_logging;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(about = "Print the resolved BNO055 driver parameters")]
struct Args {
    #[arg(short, long, default_value = "bno055")]
    node_name: String,
    #[arg(short = 's', long, default_value = "")]
    namespace: String,
    #[arg(short, long)]
    debug: bool,
}

/// Everything from the first `--ros-args` on belongs to ROS, the rest to clap.
fn split_ros_args(args: Vec<String>) -> (Vec<String>, Vec<String>) {
    match args.iter().position(|a| a == "--ros-args") {
        Some(idx) => {
            let mut cli = args;
            let ros = cli.split_off(idx);
            (cli, ros)
        }
        None => (args, Vec::new()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (cli, ros_args) = split_ros_args(std::env::args().collect());
    let args = Args::parse_from(cli);
    init_logging(args.debug);

    let node = NodeBuilder::new(&args.node_name)
        .with_namespace(&args.namespace)
        .with_arguments(&ros_args)?
        .build()?;

    let params = NodeParameters::load(&node, node.logger());
    print!("{}", params.to_parameter_file(&node.fully_qualified_name())?);
    Ok(())
}
