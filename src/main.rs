use tapedump::cli::{Cli, Commands};
use tapedump::commands;
use tapedump::error::Result;

#[tokio::main]
async fn main() {
    let args = Cli::parse_args();

    match run(args).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(args: Cli) -> Result<i32> {
    let verbose = args.verbose;

    match args.command {
        Commands::Extract {
            dir_out,
            device,
            blocksize,
            max_blocksize,
            files,
            prefix,
            extension,
            fill,
            yes,
        } => {
            commands::extract::execute(commands::extract::ExtractArgs {
                dir_out,
                device,
                blocksize,
                max_blocksize,
                files,
                prefix,
                extension,
                fill,
                yes,
                verbose,
            })
            .await
        }

        Commands::Status { device } => commands::status::execute(device, verbose).await,
    }
}
