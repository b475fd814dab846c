// Drone Wx Profile - METAR/SPECI and PIREP summaries for drone operations
// Copyright (C) 2025 FiendishDrWu
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::thread::sleep;
use std::time::Duration;
use tracing::{error, info};

use dronewx::awc_api::AwcClient;
use dronewx::config::{load_config, save_config, Config, SavedSite, CONFIG_FILE};
use dronewx::export::{save_metar_csv, save_pirep_csv};
use dronewx::geo::validate_lat_lon;
use dronewx::logging::init_logging;
use dronewx::profile::{build_summary, fetch_metar_rows, fetch_pirep_rows};
use dronewx::{CachedSource, WxError};

mod gui;
mod ui;

use ui::{
    clear_screen, draw_banner, draw_category_badge, draw_error_box, draw_input_prompt,
    draw_menu_box, draw_metar_table, draw_output_box, draw_pirep_table, draw_section_header,
    draw_success_box, read_number, read_single_char, read_text, select_site_from_list,
};

type Source = CachedSource<AwcClient>;

const USAGE: &str = "Usage: dronewx [--gui] [--config PATH]

  --gui           open the desktop window instead of the terminal menus
  --config PATH   read and write settings at PATH (default: config.json)
  -h, --help      show this message";

struct Args {
    gui: bool,
    config_path: PathBuf,
}

fn parse_args() -> Args {
    let mut args = Args {
        gui: false,
        config_path: PathBuf::from(CONFIG_FILE),
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--gui" => args.gui = true,
            "--config" => match iter.next() {
                Some(path) => args.config_path = PathBuf::from(path),
                None => usage_exit("--config needs a path"),
            },
            "-h" | "--help" => {
                println!("{}", USAGE);
                process::exit(0);
            }
            other => usage_exit(&format!("unknown argument: {}", other)),
        }
    }
    args
}

fn usage_exit(problem: &str) -> ! {
    eprintln!("{}\n\n{}", problem, USAGE);
    process::exit(1);
}

fn main() -> io::Result<()> {
    let args = parse_args();
    init_logging();

    let config = match load_config(&args.config_path) {
        Ok(config) => config,
        Err(e) => {
            error!(path = %args.config_path.display(), error = %e, "failed to load configuration");
            eprintln!("{}", e.user_message());
            process::exit(1);
        }
    };

    let client = match AwcClient::new(&config.api_base_url) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to build HTTP client");
            eprintln!("{}", e.user_message());
            process::exit(1);
        }
    };
    let source = CachedSource::new(client);
    info!(base_url = %source.inner().base_url(), gui = args.gui, "starting");

    if args.gui {
        return gui::run(config, args.config_path, source)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()));
    }

    terminal_main(config, &args.config_path, &source)
}

fn terminal_main(mut config: Config, config_path: &Path, source: &Source) -> io::Result<()> {
    clear_screen()?;

    loop {
        clear_screen()?;
        draw_banner()?;
        draw_output_box(&format!(
            "Launch area: {} | Lat {:.4}, Lon {:.4} | radius {} NM",
            config.station, config.latitude, config.longitude, config.radius_nm
        ))?;

        draw_menu_box("Main Menu", &[
            "1. Surface (METAR/SPECI)",
            "2. PIREPs",
            "3. Combined Summary",
            "4. Change Launch Area",
            "5. Saved Sites",
            "6. Exit",
        ])?;

        draw_input_prompt("Enter your choice (1-6)")?;
        sleep(Duration::from_millis(100));

        let choice = match read_single_char() {
            Ok(c) => c,
            Err(_) => {
                draw_error_box("Invalid input. Please enter a valid number.")?;
                sleep(Duration::from_secs(2));
                continue;
            }
        };

        match choice {
            '1' => surface_view(&config, source)?,
            '2' => pirep_view(&config, source)?,
            '3' => summary_view(&config, source)?,
            '4' => change_launch_area(&mut config, config_path)?,
            '5' => saved_sites_menu(&mut config, config_path)?,
            '6' => {
                draw_success_box("Fly safe! Goodbye.")?;
                return Ok(());
            }
            _ => {
                draw_error_box("Invalid input. Please enter a valid number.")?;
                sleep(Duration::from_secs(2));
            }
        }
    }
}

fn wait_for_key() -> io::Result<()> {
    draw_input_prompt("Press any key to return to main menu")?;
    // Enter comes back as an error from read_single_char but still counts
    let _ = read_single_char();
    Ok(())
}

fn confirm(prompt: &str) -> io::Result<bool> {
    draw_input_prompt(prompt)?;
    sleep(Duration::from_millis(100));
    Ok(matches!(read_single_char(), Ok(c) if c.eq_ignore_ascii_case(&'y')))
}

fn report_failure(what: &str, e: &WxError) -> io::Result<()> {
    error!(error = %e, "{} failed", what);
    draw_error_box(&e.user_message())
}

fn surface_view(config: &Config, source: &Source) -> io::Result<()> {
    clear_screen()?;
    draw_banner()?;
    draw_section_header(&format!("Surface (METAR/SPECI) - {}", config.station))?;

    let query = config.site_query();
    match fetch_metar_rows(source, &query) {
        Ok(rows) if rows.is_empty() => {
            draw_output_box(&format!(
                "No METARs returned for {} in the last {} hours.",
                query.station, query.metar_hours
            ))?;
        }
        Ok(rows) => {
            if let Some(latest) = rows.first() {
                draw_category_badge("Latest flight category", latest.category)?;
            }
            draw_metar_table(&rows)?;

            if confirm("Export this table to CSV? (y/n)")? {
                let path = PathBuf::from(format!("metars_{}.csv", query.station));
                match save_metar_csv(&path, &rows) {
                    Ok(()) => draw_success_box(&format!("Saved {}", path.display()))?,
                    Err(e) => report_failure("METAR export", &e)?,
                }
            }
        }
        Err(e) => report_failure("METAR fetch", &e)?,
    }

    wait_for_key()
}

fn pirep_view(config: &Config, source: &Source) -> io::Result<()> {
    clear_screen()?;
    draw_banner()?;
    draw_section_header("PIREPs (radius to bbox)")?;

    let query = config.site_query();
    draw_output_box(&format!(
        "{} NM around {:.4}, {:.4}\nbbox: {}",
        query.radius_nm,
        query.latitude,
        query.longitude,
        query.bbox()
    ))?;

    match fetch_pirep_rows(source, &query) {
        Ok(rows) if rows.is_empty() => {
            draw_output_box(&format!(
                "No PIREPs returned in the last {} hours.",
                query.pirep_hours
            ))?;
        }
        Ok(rows) => {
            draw_pirep_table(&rows)?;

            if confirm("Export this table to CSV? (y/n)")? {
                let path = PathBuf::from("pireps.csv");
                match save_pirep_csv(&path, &rows) {
                    Ok(()) => draw_success_box(&format!("Saved {}", path.display()))?,
                    Err(e) => report_failure("PIREP export", &e)?,
                }
            }
        }
        Err(e) => report_failure("PIREP fetch", &e)?,
    }

    wait_for_key()
}

fn summary_view(config: &Config, source: &Source) -> io::Result<()> {
    clear_screen()?;
    draw_banner()?;
    draw_section_header("Combined Summary")?;

    let summary = build_summary(source, &config.site_query());
    if let Some(surface) = &summary.surface {
        draw_category_badge("Surface", surface.category)?;
    }
    draw_output_box(&summary.lines().join("\n"))?;

    wait_for_key()
}

fn change_launch_area(config: &mut Config, config_path: &Path) -> io::Result<()> {
    clear_screen()?;
    draw_banner()?;
    draw_section_header("Change Launch Area")?;

    let mut updated = config.clone();

    draw_input_prompt("Nearby airport ICAO (METAR/SPECI)")?;
    updated.station = read_text(Some(config.station.as_str()))?.trim().to_uppercase();

    draw_input_prompt("Launch latitude")?;
    let latitude: f64 = read_number(config.latitude)?;
    draw_input_prompt("Launch longitude")?;
    let longitude: f64 = read_number(config.longitude)?;
    match validate_lat_lon(latitude, longitude) {
        Ok((lat, lon)) => {
            updated.latitude = lat;
            updated.longitude = lon;
        }
        Err(e) => {
            draw_error_box(&e.user_message())?;
            sleep(Duration::from_secs(2));
            return Ok(());
        }
    }

    draw_input_prompt("PIREP radius in NM (5-100)")?;
    updated.radius_nm = read_number(config.radius_nm)?;
    draw_input_prompt("METAR lookback hours (1-12)")?;
    updated.metar_hours = read_number(config.metar_hours)?;
    draw_input_prompt("PIREP lookback hours (1-12)")?;
    updated.pirep_hours = read_number(config.pirep_hours)?;

    // save_config validates before anything is written
    match save_config(config_path, &updated) {
        Ok(()) => {
            *config = updated;
            draw_success_box("Launch area updated")?;
        }
        Err(e) => draw_error_box(&e.user_message())?,
    }
    sleep(Duration::from_secs(1));
    Ok(())
}

fn saved_sites_menu(config: &mut Config, config_path: &Path) -> io::Result<()> {
    loop {
        clear_screen()?;
        draw_banner()?;
        draw_section_header("Saved Sites")?;

        if config.saved_sites.is_empty() {
            draw_output_box("No saved sites found. Save the current launch area to add one.")?;
        }

        draw_menu_box("Options", &[
            "1. Use a saved site",
            "2. Save current launch area",
            "3. Delete a saved site",
            "4. Return to main menu",
        ])?;

        draw_input_prompt("Enter your choice (1/2/3/4)")?;
        let choice = match read_single_char() {
            Ok(c) => c,
            Err(_) => continue,
        };

        match choice {
            '1' => {
                if let Some(site) = select_site_from_list(&config.saved_sites)? {
                    let mut updated = config.clone();
                    updated.use_site(&site);
                    persist(config, updated, config_path, &format!("Using {}", site.name))?;
                }
            }
            '2' => {
                draw_input_prompt("Name for this site")?;
                let name = read_text(None)?;
                let mut updated = config.clone();
                let site = SavedSite {
                    name,
                    station: config.station.clone(),
                    latitude: config.latitude,
                    longitude: config.longitude,
                };
                match updated.save_site(site) {
                    Ok(()) => persist(config, updated, config_path, "Site saved")?,
                    Err(e) => draw_error_box(&e.user_message())?,
                }
            }
            '3' => {
                if let Some(site) = select_site_from_list(&config.saved_sites)? {
                    let mut updated = config.clone();
                    updated.delete_site(&site.name);
                    persist(config, updated, config_path, &format!("Deleted site {}", site.name))?;
                }
            }
            '4' => return Ok(()),
            _ => draw_error_box("Invalid choice")?,
        }
        sleep(Duration::from_secs(1));
    }
}

fn persist(config: &mut Config, updated: Config, config_path: &Path, message: &str) -> io::Result<()> {
    match save_config(config_path, &updated) {
        Ok(()) => {
            *config = updated;
            draw_success_box(message)
        }
        Err(e) => report_failure("saving configuration", &e),
    }
}
