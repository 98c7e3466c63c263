/**
 * Stewart Platform Console
 *
 * Interactive front-end for the actuator controller:
 * 1. Loads link settings from a TOML file and/or the command line
 * 2. Reads operator commands from stdin (manual edits, send, motion frames)
 * 3. Polls the serial link for device output between commands
 *
 * Usage: stewart_platform [--config FILE] [--port PORT] [--baud BAUD] [--connect] [--dry-run]
 */

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use clap::Parser;
use stewart_link::config::{self, AppConfig};
use stewart_link::link::{self, MemoryOpener, PortOpener, SerialOpener};
use stewart_link::{Controller, NUM_ACTUATORS};

#[derive(Parser, Debug)]
#[command(name = "stewart_platform", about = "Drive a six-actuator Stewart platform over a serial link")]
struct Args{
    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port (overrides the config file)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate (overrides the config file)
    #[arg(short, long)]
    baud: Option<u32>,

    /// Open the link at startup
    #[arg(long)]
    connect: bool,

    /// Use an in-memory port instead of real hardware
    #[arg(long)]
    dry_run: bool,

    /// trace, debug, info, warn or error
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>>{
    let args = Args::parse();

    let level = args.log_level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let mut settings = match &args.config{
        Some(path) =>{
            tracing::info!("Loading configuration from: {}", path.display());
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };
    if let Some(port) = &args.port{
        settings.link.port_name = port.clone();
    }
    if let Some(baud) = args.baud{
        settings.link.baud_rate = baud;
    }
    settings.validate()?;

    tracing::info!("Link: {} @ {}", settings.link.port_name, settings.link.summary());

    if args.dry_run{
        let opener = MemoryOpener::new();
        run(Controller::new(opener.clone()), &settings, args.connect, Some(opener))
    }else{
        run(Controller::new(SerialOpener), &settings, args.connect, None)
    }
}

fn run<O: PortOpener>(
    mut controller: Controller<O>,
    settings: &AppConfig,
    connect: bool,
    dry_run: Option<MemoryOpener>,
) -> Result<(), Box<dyn std::error::Error>>{
    if connect || settings.auto_connect{
        controller.apply_config(&settings.link);
    }

    print_help();

    //stdin is read on its own thread; every state change happens on this one
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move ||{
        let stdin = io::stdin();
        for line in stdin.lock().lines(){
            match line{
                Ok(line) =>{
                    if tx.send(line).is_err(){
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let poll = Duration::from_millis(settings.poll_interval_ms.max(1));
    let mut printed = print_new_log(&controller, 0);
    prompt()?;

    loop{
        match rx.recv_timeout(poll){
            Ok(line) =>{
                let keep_going = handle_line(&line, &mut controller, settings, dry_run.as_ref());
                printed = print_new_log(&controller, printed);
                if !keep_going{
                    break;
                }
                prompt()?;
            }
            Err(RecvTimeoutError::Timeout) =>{
                if controller.on_readable() > 0{
                    printed = print_new_log(&controller, printed);
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    controller.shutdown();
    print_new_log(&controller, printed);
    println!("Goodbye!");
    Ok(())
}

fn handle_line<O: PortOpener>(
    line: &str,
    controller: &mut Controller<O>,
    settings: &AppConfig,
    dry_run: Option<&MemoryOpener>,
) -> bool{
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else{
        return true;
    };
    let rest: Vec<&str> = parts.collect();

    match cmd{
        "set" | "s" =>{
            match (rest.first().and_then(|s| s.parse::<usize>().ok()), rest.get(1).and_then(|s| s.parse::<i32>().ok())){
                //a rejected edit shows up in the log
                (Some(index), Some(value)) =>{
                    let _ = controller.manual_source().update(index, value);
                }
                _ => println!("usage: set <index 0-{}> <value>", NUM_ACTUATORS - 1),
            }
        }
        "send" =>{
            controller.manual_source().request_send();
        }
        "frame" | "f" =>{
            let values: Result<Vec<i32>, _> = rest.iter().map(|s| s.parse::<i32>()).collect();
            match values{
                Ok(values) =>{
                    let _ = controller.motion_source().frame(&values);
                }
                Err(e) => println!("bad frame: {}", e),
            }
        }
        "leap" =>{
            match rest.first().copied(){
                Some("on") => controller.set_motion_enabled(true),
                Some("off") => controller.set_motion_enabled(false),
                _ => println!("usage: leap on|off"),
            }
        }
        "motion" =>{
            match rest.first().copied(){
                Some("up") => controller.motion_source().set_connected(true),
                Some("down") => controller.motion_source().set_connected(false),
                _ => println!("usage: motion up|down"),
            }
        }
        "connect" =>{
            let mut cfg = settings.link.clone();
            if let Some(port) = rest.first(){
                cfg.port_name = port.to_string();
            }
            if let Some(baud) = rest.get(1){
                match baud.parse(){
                    Ok(b) => cfg.baud_rate = b,
                    Err(_) =>{
                        println!("bad baud rate: {}", baud);
                        return true;
                    }
                }
            }
            controller.apply_config(&cfg);
        }
        "disconnect" =>{
            controller.disconnect();
        }
        "read" =>{
            controller.on_readable();
        }
        "status" =>{
            let s = controller.status();
            println!("[LINK]   {}", s.link);
            println!("[LEAP]   {}", s.motion);
            println!("[SEND]   {}", if s.send_enabled { "enabled" } else { "disabled" });
            println!("[MOTION] {}", if s.motion_enabled { "drives sends" } else { "manual only" });
            println!("[VECTOR] {}", controller.actuators().serialize().trim_end());
            println!("[SENT]   {} line(s)", s.lines_sent);
            if let Some(opener) = dry_run{
                println!("[DRY]    {} byte(s) written", opener.written().len());
            }
        }
        "log" =>{
            for entry in controller.log(){
                println!("{}", entry);
            }
        }
        "ports" =>{
            match link::available_ports(){
                Ok(ports) if ports.is_empty() => println!("no serial ports found"),
                Ok(ports) =>{
                    for p in ports{
                        println!("{:<20} {}", p.name, p.description);
                    }
                }
                Err(e) => println!("port enumeration failed: {}", e),
            }
        }
        "help" | "?" => print_help(),
        "quit" | "exit" | "x" => return false,
        _ => println!("Unknown command: {}", cmd),
    }
    true
}

fn print_new_log<O: PortOpener>(controller: &Controller<O>, already: usize) -> usize{
    let entries = controller.log().entries();
    for entry in &entries[already.min(entries.len())..]{
        println!("{}", entry);
    }
    entries.len()
}

fn prompt() -> io::Result<()>{
    print!("> ");
    io::stdout().flush()
}

fn print_help(){
    println!("[Commands]");
    println!("  set <i> <v>          - edit actuator i (0-{})", NUM_ACTUATORS - 1);
    println!("  send                 - transmit the current vector");
    println!("  frame <v1> .. <v6>   - inject a motion frame");
    println!("  leap on|off          - let motion frames drive sends");
    println!("  motion up|down       - motion tracker connected/disconnected");
    println!("  connect [port] [baud]- (re)open the serial link");
    println!("  disconnect           - close the serial link");
    println!("  read                 - drain device output now");
    println!("  status | log | ports");
    println!("  quit");
}
