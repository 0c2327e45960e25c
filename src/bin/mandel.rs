extern crate clap;
extern crate env_logger;
extern crate failure;
extern crate image;
extern crate log;
extern crate mandelbrot;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use failure::{format_err, Error};
use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use log::info;
use mandelbrot::{render_parallel, Contrast, DeviceSize, FractalRenderer, Outcome, Raster};
use num::Complex;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::str::FromStr;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex { re, im })
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

// Both components of a zoom focus must lie in the canonical view.
fn validate_focus(s: &str) -> Result<(), String> {
    match parse_complex(s) {
        Some(c) if c.re.abs() <= 2.0 && c.im.abs() <= 2.0 => Ok(()),
        Some(_) => Err("Focus components must be between -2 and 2".to_string()),
        None => Err("Could not parse focus point".to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const ITERATIONS: &str = "iterations";
const CONTRAST: &str = "contrast";
const FOCUS: &str = "focus";
const ZOOM: &str = "zoom";
const THREADS: &str = "threads";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("mandel")
        .version("0.1.0")
        .about("Mandelbrot set explorer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file (binary PPM)"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("600x600")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("128")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        200_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 200000",
                    )
                })
                .help("Maximum iterations per point"),
        )
        .arg(
            Arg::with_name(CONTRAST)
                .required(false)
                .long(CONTRAST)
                .short("c")
                .takes_value(true)
                .default_value("med")
                .validator(|s| Contrast::from_str(&s).map(|_| ()))
                .help("Colour contrast: hi, med, low or a multiplier"),
        )
        .arg(
            Arg::with_name(FOCUS)
                .required(false)
                .long(FOCUS)
                .short("f")
                .takes_value(true)
                .allow_hyphen_values(true)
                .requires(ZOOM)
                .validator(|s| validate_focus(&s))
                .help("Point of the complex plane to zoom into, as re,im [default: 0,0]"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .required(false)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        2.0,
                        10_000.0,
                        "Could not parse zoom factor",
                        "Zoom factor must be between 2 and 10000",
                    )
                })
                .help("Zoom factor; without it the whole set is drawn"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to use in renderer"),
        )
        .get_matches()
}

fn write_image(outfile: &str, pixels: &[u8], bounds: (usize, usize)) -> Result<(), std::io::Error> {
    let path = Path::new(outfile);
    let output = BufWriter::new(File::create(&path)?);
    let mut encoder =
        PNMEncoder::new(output).with_subtype(PNMSubtype::Pixmap(SampleEncoding::Binary));
    encoder.encode(pixels, bounds.0 as u32, bounds.1 as u32, ColorType::RGB(8))?;
    Ok(())
}

fn value<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, Error> {
    matches
        .value_of(name)
        .ok_or_else(|| format_err!("Missing value for --{}", name))
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let (width, height) = parse_pair::<u16>(value(matches, SIZE)?, 'x')
        .ok_or_else(|| format_err!("Error parsing image dimensions"))?;
    let iterations = u32::from_str(value(matches, ITERATIONS)?)?;
    let contrast =
        Contrast::from_str(value(matches, CONTRAST)?).map_err(|e| format_err!("{}", e))?;
    let threads = usize::from_str(value(matches, THREADS)?)?;

    let device = DeviceSize::new(usize::from(width), usize::from(height));
    let mut renderer = FractalRenderer::new(device, iterations, contrast.multiplier())?;
    match matches.value_of(ZOOM) {
        Some(zoom) => {
            let focus = parse_complex(matches.value_of(FOCUS).unwrap_or("0,0"))
                .ok_or_else(|| format_err!("Error parsing focus point"))?;
            renderer.zoom_into(focus, f64::from_str(zoom)?)?;
        }
        None => renderer.restart(),
    }

    let (settings, cancel) = renderer.start_pass();
    let mut raster = Raster::new(device);
    if let Outcome::Cancelled { rows_completed } =
        render_parallel(&settings, &mut raster, threads, &cancel)?
    {
        return Err(format_err!("Render stopped after {} rows", rows_completed));
    }

    let outfile = value(matches, OUTPUT)?;
    write_image(outfile, &raster.to_rgb_bytes(), (device.width, device.height))?;
    info!(
        "wrote {}x{} image of {} (contrast {}) to {}",
        device.width,
        device.height,
        settings.viewport.center(),
        contrast,
        outfile
    );
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
