//! ndnetcdf CLI - Inspect frame files and write synthetic ones.

use ndnetcdf::netcdf::NcValues;
use ndnetcdf::prelude::*;
use std::env;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_DEMO_FRAMES: usize = 10;
const DEMO_DIMS: [usize; 2] = [64, 48];

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "info";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "error",
            _ => filtered_args.push(arg),
        }
    }

    let json_mode = filtered_args.iter().any(|&s| s == "--json" || s == "-j");
    if json_mode {
        level = "error";
    }
    filtered_args.retain(|&s| s != "--json" && s != "-j");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_writer(std::io::stderr)
        .init();

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let result = match filtered_args[0] {
        "info" | "i" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing file argument");
                eprintln!("Usage: ndnetcdf info <file.nc> [--json]");
                std::process::exit(1);
            }
            cmd_info(filtered_args[1], json_mode)
        }

        "demo" | "d" => {
            if filtered_args.len() < 2 {
                eprintln!("Error: missing output argument");
                eprintln!("Usage: ndnetcdf demo <out.nc> [frames] [type]");
                std::process::exit(1);
            }
            let frames = match filtered_args.get(2).map(|s| s.parse::<usize>()) {
                None => DEFAULT_DEMO_FRAMES,
                Some(Ok(n)) if n > 0 => n,
                Some(_) => {
                    eprintln!("Error: frame count must be a positive integer");
                    std::process::exit(1);
                }
            };
            let data_type = match filtered_args.get(3) {
                None => DataType::UInt16,
                Some(name) => match DataType::from_name(name) {
                    Some(t) => t,
                    None => {
                        eprintln!("Error: unknown element type {:?}", name);
                        eprintln!("Types: int8 uint8 int16 uint16 int32 uint32 float32 float64");
                        std::process::exit(1);
                    }
                },
            };
            cmd_demo(filtered_args[1], frames, data_type)
        }

        "version" | "-V" | "--version" => {
            print_version();
            Ok(())
        }

        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        // Default: if file exists, show info; otherwise error
        _ => {
            if Path::new(filtered_args[0]).exists() {
                cmd_info(filtered_args[0], json_mode)
            } else {
                eprintln!("Unknown command: {}", filtered_args[0]);
                eprintln!();
                print_help();
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_version() {
    let stamp = option_env!("NDNETCDF_BUILD_STAMP").unwrap_or("unknown");
    println!("ndnetcdf {} (built {})", env!("CARGO_PKG_VERSION"), stamp);
}

fn print_help() {
    print_version();
    println!();
    println!("USAGE:");
    println!("    ndnetcdf [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info   <file> [--json]            Show dimensions, attributes and variables");
    println!("    d, demo   <out> [frames] [type]      Write synthetic frames (default 10 x uint16)");
    println!("    version                              Show version and build stamp");
    println!("    h, help                              Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Suppress all output except errors");
    println!("    -j, --json       Machine-readable output for info");
    println!();
    println!("EXAMPLES:");
    println!("    ndnetcdf demo scan.nc 20 float32     # 20 frames of 64x48 float32");
    println!("    ndnetcdf info scan.nc                # Quick overview");
    println!("    ndnetcdf info scan.nc --json         # Export header as JSON");
    println!();
    println!("NOTES:");
    println!("    - Passing a file directly is equivalent to 'info'");
    println!("    - RUST_LOG overrides the -v/-q flags");
}

fn cmd_info(path: &str, json_mode: bool) -> Result<()> {
    info!("Opening file: {}", path);
    let reader = NcReader::open(path)?;
    debug!("Header parsed: {} dims, {} vars", reader.dims().len(), reader.vars().len());

    if json_mode {
        return print_info_json(path, &reader);
    }

    let header = reader.header();
    println!("File:    {}", path);
    println!("Format:  {}", reader.format());
    println!("Records: {}", reader.record_count());
    if let Some(t) = reader
        .global_attr("dataType")
        .and_then(NcValues::as_ints)
        .and_then(|v| v.first().copied())
        .and_then(DataType::from_code)
    {
        println!("Element: {}", t);
    }
    println!();

    println!("Dimensions:");
    for dim in reader.dims() {
        if dim.is_unlimited() {
            println!("  {} = UNLIMITED ({} currently)", dim.name, reader.record_count());
        } else {
            println!("  {} = {}", dim.name, dim.len);
        }
    }
    println!();

    println!("Global attributes:");
    for attr in &header.attrs {
        println!("  {} = {}", attr.name, format_values(&attr.values));
    }
    println!();

    println!("Variables:");
    for var in reader.vars() {
        let dims = reader.var_dim_names(&var.name)?.join(", ");
        println!("  {} {}({})", var.nc_type, var.name, dims);
    }
    Ok(())
}

fn print_info_json(path: &str, reader: &NcReader) -> Result<()> {
    let header = reader.header();
    let dims: Vec<serde_json::Value> = reader
        .dims()
        .iter()
        .map(|d| {
            let len = if d.is_unlimited() { reader.record_count() } else { d.len };
            serde_json::json!({
                "name": d.name,
                "len": len,
                "unlimited": d.is_unlimited(),
            })
        })
        .collect();

    let attrs: serde_json::Map<String, serde_json::Value> = header
        .attrs
        .iter()
        .map(|a| (a.name.clone(), values_json(&a.values)))
        .collect();

    let mut vars = Vec::with_capacity(reader.vars().len());
    for var in reader.vars() {
        vars.push(serde_json::json!({
            "name": var.name,
            "type": var.nc_type.name(),
            "dims": reader.var_dim_names(&var.name)?,
            "shape": reader.var_shape(&var.name)?,
        }));
    }

    let doc = serde_json::json!({
        "path": path,
        "format": reader.format().to_string(),
        "records": reader.record_count(),
        "dimensions": dims,
        "attributes": attrs,
        "variables": vars,
    });
    println!("{}", serde_json::to_string_pretty(&doc).unwrap_or_default());
    Ok(())
}

fn format_values(values: &NcValues) -> String {
    fn join<T: ToString>(v: &[T]) -> String {
        v.iter().map(T::to_string).collect::<Vec<_>>().join(", ")
    }
    match values {
        NcValues::Char(_) => format!("{:?}", values.as_text().unwrap_or_default()),
        NcValues::Byte(v) => join(v),
        NcValues::Short(v) => join(v),
        NcValues::Int(v) => join(v),
        NcValues::Float(v) => join(v),
        NcValues::Double(v) => join(v),
    }
}

fn values_json(values: &NcValues) -> serde_json::Value {
    fn list<T: Into<serde_json::Value> + Copy>(v: &[T]) -> serde_json::Value {
        match v {
            [one] => (*one).into(),
            many => serde_json::Value::Array(many.iter().map(|&x| x.into()).collect()),
        }
    }
    match values {
        NcValues::Char(_) => values.as_text().unwrap_or_default().into(),
        NcValues::Byte(v) => list(v),
        NcValues::Short(v) => list(v),
        NcValues::Int(v) => list(v),
        NcValues::Float(v) => list(v),
        NcValues::Double(v) => list(v),
    }
}

fn cmd_demo(path: &str, frames: usize, data_type: DataType) -> Result<()> {
    info!("Writing {} {} frames to {}", frames, data_type, path);

    let mode = if frames > 1 {
        FileOpenMode::WRITE | FileOpenMode::MULTIPLE
    } else {
        FileOpenMode::WRITE
    };

    let first = synthetic_frame(data_type, 0)?;
    let mut writer = NetCdfFileWriter::new();
    writer.open(Path::new(path), mode, &first)?;
    writer.write(&first)?;
    for index in 1..frames {
        writer.write(&synthetic_frame(data_type, index)?)?;
    }
    writer.close()?;

    info!("Done: {} frames", frames);
    Ok(())
}

/// Ramp pattern shifted per frame, with a few typical detector attributes.
fn synthetic_frame(data_type: DataType, index: usize) -> Result<ArrayFrame> {
    let n = DEMO_DIMS[0] * DEMO_DIMS[1];
    let value = |i: usize| ((i + index * 7) % 251) as u8;

    let frame = match data_type {
        DataType::Int8 => ArrayFrame::from_elements(DEMO_DIMS, &ramp(n, |i| value(i) as i8))?,
        DataType::UInt8 => ArrayFrame::from_elements(DEMO_DIMS, &ramp(n, value))?,
        DataType::Int16 => ArrayFrame::from_elements(DEMO_DIMS, &ramp(n, |i| value(i) as i16 - 100))?,
        DataType::UInt16 => ArrayFrame::from_elements(DEMO_DIMS, &ramp(n, |i| value(i) as u16 * 16))?,
        DataType::Int32 => ArrayFrame::from_elements(DEMO_DIMS, &ramp(n, |i| value(i) as i32 - 1000))?,
        DataType::UInt32 => ArrayFrame::from_elements(DEMO_DIMS, &ramp(n, |i| value(i) as u32 * 1000))?,
        DataType::Float32 => ArrayFrame::from_elements(DEMO_DIMS, &ramp(n, |i| value(i) as f32 * 0.5))?,
        DataType::Float64 => ArrayFrame::from_elements(DEMO_DIMS, &ramp(n, |i| value(i) as f64 * 0.25))?,
    };

    Ok(frame
        .with_unique_id(index as i32 + 1)
        .with_time_stamp(index as f64 * 0.1)
        .with_attribute(Attribute::new("FrameIndex", "frame counter", index as i32))
        .with_attribute(Attribute::new("Temperature", "sensor temperature", 20.0 + index as f64 * 0.5))
        .with_attribute(Attribute::new("Detector", "detector model", "ndnetcdf-demo")))
}

fn ramp<T>(n: usize, f: impl Fn(usize) -> T) -> Vec<T> {
    (0..n).map(f).collect()
}
