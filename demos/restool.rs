use clap::{App, Arg, SubCommand};
use iconres::{Bitmap, Icon};
use std::fs;
use std::path::PathBuf;

//===========================================================================//

fn main() {
    let matches = App::new("restool")
        .version("0.1")
        .about("Converts BMP images into ICO files and icon resources")
        .subcommand(
            SubCommand::with_name("convert")
                .about("Encodes a 24-bit BMP as a single-image ICO file")
                .arg(
                    Arg::with_name("output")
                        .takes_value(true)
                        .value_name("PATH")
                        .short("o")
                        .long("output")
                        .help("Sets output path"),
                )
                .arg(Arg::with_name("bmp").required(true)),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("Lists the images stored in an ICO file")
                .arg(Arg::with_name("ico").required(true)),
        )
        .subcommand(
            SubCommand::with_name("header")
                .about(
                    "Emits the RT_GROUP_ICON resource header for an ICO or \
                     BMP file",
                )
                .arg(
                    Arg::with_name("output")
                        .takes_value(true)
                        .value_name("PATH")
                        .short("o")
                        .long("output")
                        .help("Writes raw bytes to PATH instead of hex"),
                )
                .arg(Arg::with_name("file").required(true)),
        )
        .get_matches();
    if let Some(submatches) = matches.subcommand_matches("convert") {
        let path = submatches.value_of("bmp").unwrap();
        let bitmap = Bitmap::open(path).unwrap();
        let out_path = if let Some(output) = submatches.value_of("output") {
            PathBuf::from(output)
        } else {
            PathBuf::from(path).with_extension("ico")
        };
        bitmap.save_ico(&out_path).unwrap();
        println!(
            "Wrote {}x{} icon to {:?}",
            bitmap.width(),
            bitmap.height(),
            out_path
        );
    } else if let Some(submatches) = matches.subcommand_matches("list") {
        let path = submatches.value_of("ico").unwrap();
        let icon = Icon::open(path).unwrap();
        for entry in icon.entries().iter() {
            println!(
                "{:5}: {}x{} {} bpp, {} bytes",
                entry.icon_id(),
                entry.width(),
                entry.height(),
                entry.bits_per_pixel(),
                entry.resource_size()
            );
        }
    } else if let Some(submatches) = matches.subcommand_matches("header") {
        let path = submatches.value_of("file").unwrap();
        let icon = if path.to_ascii_lowercase().ends_with(".bmp") {
            iconres::icon_from_bmp(path).unwrap()
        } else {
            Icon::open(path).unwrap()
        };
        let header = icon.resource_header();
        match submatches.value_of("output") {
            Some(output) => fs::write(output, &header).unwrap(),
            None => {
                for chunk in header.chunks(16) {
                    let hex: Vec<String> =
                        chunk.iter().map(|byte| format!("{:02x}", byte)).collect();
                    println!("{}", hex.join(" "));
                }
            }
        }
    }
}

//===========================================================================//
