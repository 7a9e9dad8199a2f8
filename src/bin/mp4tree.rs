use clap::{ArgAction, Parser};
use mp4tree::{
    BoxRef, ContainerTypes, FileSource, FourCC, Mp4Reader, ParseOptions, Registry, TilingPolicy,
    default_registry, json_boxes,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Print the box tree of an MP4/ISOBMFF file")]
struct Args {
    /// MP4/ISOBMFF file path
    path: String,

    /// Print decoded records for boxes with a known decoder
    #[arg(long, action = ArgAction::SetTrue)]
    decode: bool,

    /// Emit JSON instead of the text tree
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Limit recursion depth
    #[arg(long, default_value_t = 64)]
    max_depth: usize,

    /// Extra container type to descend into (repeatable)
    #[arg(long = "container", value_name = "4CC")]
    containers: Vec<String>,

    /// Only descend into moov (plus any --container)
    #[arg(long, action = ArgAction::SetTrue)]
    minimal: bool,

    /// Fail when a box runs past the end of its parent
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,

    /// Hex-dump the payload of every box of this 4CC
    #[arg(long = "raw", value_name = "4CC")]
    raw: Option<String>,

    /// Bytes to dump per box with --raw (0 means the entire payload)
    #[arg(long, default_value_t = 0)]
    bytes: u64,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        let level = if args.verbose { "debug" } else { "info" };
        format!("mp4tree={level}")
    });
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .init();

    let opts = parse_options(&args)?;
    let reader = Mp4Reader::open_with(&args.path, &opts)?;
    let reg = default_registry();

    if args.json {
        let tree = json_boxes(&reader, &opts, args.decode.then_some(&reg));
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    for b in reader.iter() {
        print_box(&reader, b, args.decode, &reg);
    }

    if let Some(sel) = &args.raw {
        let typ = parse_fourcc(sel)?;
        dump_raw(&reader, typ, args.bytes)?;
    }

    Ok(())
}

fn parse_options(args: &Args) -> anyhow::Result<ParseOptions> {
    let mut containers = if args.minimal {
        ContainerTypes::minimal()
    } else {
        ContainerTypes::default()
    };
    for c in &args.containers {
        containers = containers.with(parse_fourcc(c)?);
    }
    let tiling = if args.strict {
        TilingPolicy::Strict
    } else {
        TilingPolicy::Lenient
    };
    Ok(ParseOptions::new()
        .with_container_types(containers)
        .with_tiling(tiling)
        .with_max_depth(args.max_depth))
}

fn parse_fourcc(s: &str) -> anyhow::Result<FourCC> {
    FourCC::from_str(s).ok_or_else(|| anyhow::anyhow!("box type must be 4 bytes, got {s:?}"))
}

// ---------- Human-readable tree ----------

fn print_box(reader: &Mp4Reader<FileSource>, b: &BoxRef, decode: bool, reg: &Registry) {
    let prefix = "--|".repeat(b.depth + 1);
    println!("{prefix} {}", b.summary());
    if !decode {
        return;
    }
    match reader.decode(b, reg) {
        Some(Ok(v)) => println!("{prefix}     -> {v}"),
        Some(Err(e)) => println!("{prefix}     -> [decode error: {e}]"),
        None => {}
    }
}

// ---------- Raw dump ----------

fn dump_raw(reader: &Mp4Reader<FileSource>, typ: FourCC, limit: u64) -> anyhow::Result<()> {
    for (i, b) in reader.find_all(typ).enumerate() {
        let dr = b.payload_range();
        let to_read = if limit == 0 { dr.size() } else { limit.min(dr.size()) };
        let dump = reader.hex_range(dr.start, to_read)?;
        println!(
            "\n== Dump {} ({}) payload: offset={:#x}, len={} ==",
            i, b.typ, dump.offset, dump.length
        );
        print!("{}", dump.hex);
    }
    Ok(())
}
