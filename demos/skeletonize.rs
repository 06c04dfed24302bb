use clap::Parser;
use geojson::GeoJson;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use straight_skeleton::io::{parse_multi_polygon, skeleton_to_geojson};
use straight_skeleton::SkeletonBuilder;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input GeoJSON file (Polygons or MultiPolygons)
    #[arg(short, long)]
    input: PathBuf,

    /// Output GeoJSON file (one Polygon feature per skeleton face)
    #[arg(short, long)]
    output: PathBuf,

    /// Tolerance relative to the input extent
    #[arg(long, default_value_t = straight_skeleton::builder::DEFAULT_RELATIVE_EPSILON)]
    relative_epsilon: f64,

    /// Decimal digits kept in face heights
    #[arg(long, default_value_t = straight_skeleton::builder::DEFAULT_DISTANCE_DIGITS)]
    digits: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("Reading input from {:?}", args.input);
    let input = fs::read_to_string(&args.input)?;
    let multi_polygon = parse_multi_polygon(&input)?;

    println!("Loaded {} polygons. Building skeleton...", multi_polygon.0.len());

    let builder = SkeletonBuilder::new()
        .with_relative_epsilon(args.relative_epsilon)
        .with_distance_digits(args.digits);
    let skeleton = builder.build_multi_polygon(&multi_polygon)?;

    println!("Built {} faces.", skeleton.edges.len());

    let file = File::create(&args.output)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &GeoJson::FeatureCollection(skeleton_to_geojson(&skeleton)))?;

    println!("Wrote output to {:?}", args.output);

    Ok(())
}
