//! Command-line front end for the trick-taking engine.
//!
//! One machine per player: `host` announces a session and takes seat 0,
//! `join`/`find` take the remaining seats, and `solo` fills every other
//! seat with a computer player. The local seat always talks to this
//! terminal over the line-oriented JSON protocol.

use anyhow::{bail, Context, Result};
use pico_args::Arguments;
use std::fs;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use open_whist::net::{discover_and_join, host_session, join_session, PeerNetwork};
use open_whist::player::{AiPlayer, LocalPlayer, PlayerIo, RemotePlayer};
use open_whist::spec::RuleSpec;
use open_whist::Engine;

const HELP: &str = "\
Play a rule-defined trick-taking card game

USAGE:
  open_whist <COMMAND> [OPTIONS]

COMMANDS:
  solo                  Play against computer seats on this machine
  host                  Host a networked session and take seat 0
  join                  Join a session at a known host address
  find                  Discover a session on the local network and join it

OPTIONS:
  --spec FILE           Rule document (solo and host)
  --seed N              Shuffle seed  [default: random]
  --label NAME          Session label to announce or search for
  --port P              TCP port to listen on  [default: any free port]
  --host ADDR           Host address for join, as ip:port
  --name NAME           Display name for the local seat  [default: player]

FLAGS:
  -h, --help            Print help information
";

fn main() -> Result<()> {
    env_logger::init();
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let command: String = pargs
        .free_from_str()
        .context("missing command; try --help")?;
    let name: String = pargs
        .value_from_str("--name")
        .unwrap_or_else(|_| "player".to_string());
    let seed: u64 = pargs.value_from_str("--seed").unwrap_or_else(|_| rand::random());
    let port: u16 = pargs.value_from_str("--port").unwrap_or(0);

    match command.as_str() {
        "solo" => {
            let document = read_document(&mut pargs)?;
            let spec = Arc::new(RuleSpec::from_str(&document)?);
            let seats = (0..spec.num_players)
                .map(|i| {
                    if i == 0 {
                        PlayerIo::from(LocalPlayer::stdio(i, name.clone()))
                    } else {
                        PlayerIo::from(AiPlayer::new(i, format!("cpu{i}"), seed.wrapping_add(i as u64)))
                    }
                })
                .collect();
            Engine::new(spec, seats, seed)?.run_session()?;
        }
        "host" => {
            let document = read_document(&mut pargs)?;
            let spec = Arc::new(RuleSpec::from_str(&document)?);
            let label: Option<String> = pargs.opt_value_from_str("--label")?;
            let listener = TcpListener::bind(("0.0.0.0", port))
                .context("could not bind the session listener")?;
            println!(
                "hosting '{}' on port {}, waiting for {} more player(s)",
                spec.name,
                listener.local_addr()?.port(),
                spec.num_players.saturating_sub(1)
            );
            let net = host_session(listener, label.as_deref(), document, spec.num_players, seed)?;
            run_networked(spec, net, &name)?;
        }
        "join" => {
            let host: SocketAddr = pargs
                .value_from_str("--host")
                .context("join needs --host ip:port")?;
            let listener = TcpListener::bind(("0.0.0.0", port))
                .context("could not bind the session listener")?;
            let net = join_session(host, listener)?;
            let spec = Arc::new(RuleSpec::from_str(net.spec_document())?);
            run_networked(spec, net, &name)?;
        }
        "find" => {
            let label: String = pargs
                .value_from_str("--label")
                .context("find needs --label NAME")?;
            let listener = TcpListener::bind(("0.0.0.0", port))
                .context("could not bind the session listener")?;
            println!("searching for session '{label}'...");
            let net = discover_and_join(&label, listener)?;
            let spec = Arc::new(RuleSpec::from_str(net.spec_document())?);
            run_networked(spec, net, &name)?;
        }
        other => bail!("unknown command '{other}'; try --help"),
    }
    Ok(())
}

fn read_document(pargs: &mut Arguments) -> Result<String> {
    let path: String = pargs
        .value_from_str("--spec")
        .context("this command needs --spec FILE")?;
    fs::read_to_string(&path).with_context(|| format!("could not read rule document '{path}'"))
}

fn run_networked(spec: Arc<RuleSpec>, net: PeerNetwork, name: &str) -> Result<()> {
    println!(
        "session established: seat {} of {}",
        net.local_seat(),
        net.player_count()
    );
    let local = net.local_seat();
    let seats = (0..net.player_count())
        .map(|i| {
            if i == local {
                PlayerIo::from(LocalPlayer::stdio(i, name.to_string()))
            } else {
                PlayerIo::from(RemotePlayer::new(i, format!("player{i}")))
            }
        })
        .collect();
    Engine::with_network(spec, seats, net)?.run_session()?;
    Ok(())
}
