use crate::commands::{run_evaluate, run_listings, run_route, EvaluateArgs, ListingsArgs, RouteArgs};
use crate::server;
use boardinghouse::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "boardinghouse-api",
    about = "Serve and inspect the student boarding-house accreditation service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score an accreditation questionnaire stored as JSON
    Evaluate(EvaluateArgs),
    /// Plan a route between two coordinates, drawing a straight line if routing is down
    Route(RouteArgs),
    /// Print catalog and user-added listings
    Listings(ListingsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
        Command::Route(args) => run_route(args).await,
        Command::Listings(args) => run_listings(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["boardinghouse-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn route_requires_all_coordinates() {
        let missing = Cli::try_parse_from([
            "boardinghouse-api",
            "route",
            "--start-lat",
            "9.6725",
            "--start-lng",
            "123.8563",
        ]);
        assert!(missing.is_err());

        let cli = Cli::try_parse_from([
            "boardinghouse-api",
            "route",
            "--start-lat",
            "9.6725",
            "--start-lng",
            "123.8563",
            "--end-lat",
            "9.6150",
            "--end-lng",
            "123.8650",
        ])
        .expect("parses");
        assert!(matches!(cli.command, Some(Command::Route(_))));
    }

    #[test]
    fn serve_accepts_host_and_port_overrides() {
        let cli = Cli::try_parse_from(["boardinghouse-api", "serve", "--host", "0.0.0.0", "--port", "8080"])
            .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
                assert_eq!(args.port, Some(8080));
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }
}
