use clap::Parser;

use weatherwarn::CliArgs;
use weatherwarn::config::Config;

fn main() {
    env_logger::init();
    let args = CliArgs::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to initialize tokio runtime")
        .block_on(weatherwarn::run(config, args.one_shot));

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
