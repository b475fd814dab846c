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

use eframe::egui::{self, Color32, RichText, Rounding, Stroke, Vec2};
use std::path::PathBuf;

use dronewx::awc_api::AwcClient;
use dronewx::config::{save_config, Config, SavedSite, LOOKBACK_RANGE_HOURS, RADIUS_RANGE_NM};
use dronewx::export::{save_metar_csv, save_pirep_csv};
use dronewx::geo::validate_lat_lon;
use dronewx::profile::{
    build_summary, display_ceiling, display_visibility, fetch_metar_rows, fetch_pirep_rows,
    join_heights, MetarRow, PirepRow, SiteQuery, Summary,
};
use dronewx::{CachedSource, FlightCategory};

// Retro theme colors
const BACKGROUND: Color32 = Color32::from_rgb(10, 10, 20);
const PANEL_BACKGROUND: Color32 = Color32::from_rgb(20, 20, 35);
const CYAN_GLOW: Color32 = Color32::from_rgb(0, 255, 255);
const MAGENTA_GLOW: Color32 = Color32::from_rgb(255, 0, 255);
const ACCENT_COLOR: Color32 = Color32::from_rgb(0, 150, 255);
const TEXT_COLOR: Color32 = Color32::from_rgb(200, 200, 255);
const TAB_ACTIVE: Color32 = Color32::from_rgb(5, 5, 10);
const TAB_INACTIVE: Color32 = Color32::from_rgb(5, 5, 10);

type Source = CachedSource<AwcClient>;

#[derive(Default, PartialEq, Clone, Copy)]
enum Tab {
    #[default]
    Surface,
    Pireps,
    Summary,
    SavedSites,
}

pub struct DroneWxApp {
    config: Config,
    config_path: PathBuf,
    source: Source,
    input_station: String,
    input_lat: f64,
    input_lon: f64,
    radius_nm: f64,
    metar_hours: u32,
    pirep_hours: u32,
    new_site_name: String,
    metar_rows: Vec<MetarRow>,
    pirep_rows: Vec<PirepRow>,
    summary: Option<Summary>,
    error_message: Option<String>,
    success_message: Option<String>,
    selected_tab: Tab,
}

pub fn run(config: Config, config_path: PathBuf, source: Source) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1100.0, 760.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Drone Wx Profile",
        options,
        Box::new(move |cc| -> Box<dyn eframe::App> {
            Box::new(DroneWxApp::new(cc, config, config_path, source))
        }),
    )
}

impl DroneWxApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config, config_path: PathBuf, source: Source) -> Self {
        let mut style = (*cc.egui_ctx.style()).clone();
        style.visuals.window_rounding = Rounding::default();
        style.visuals.window_fill = BACKGROUND;
        style.visuals.window_stroke = Stroke::new(1.0, CYAN_GLOW);
        style.visuals.widgets.noninteractive.bg_fill = PANEL_BACKGROUND;
        style.visuals.widgets.inactive.bg_fill = PANEL_BACKGROUND;
        style.visuals.widgets.hovered.bg_fill = ACCENT_COLOR;
        style.visuals.widgets.active.bg_fill = MAGENTA_GLOW;
        style.visuals.panel_fill = PANEL_BACKGROUND;
        cc.egui_ctx.set_style(style);

        Self {
            input_station: config.station.clone(),
            input_lat: config.latitude,
            input_lon: config.longitude,
            radius_nm: config.radius_nm,
            metar_hours: config.metar_hours,
            pirep_hours: config.pirep_hours,
            config,
            config_path,
            source,
            new_site_name: String::new(),
            metar_rows: Vec::new(),
            pirep_rows: Vec::new(),
            summary: None,
            error_message: None,
            success_message: None,
            selected_tab: Tab::default(),
        }
    }
}

impl eframe::App for DroneWxApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_header(ui);
            self.draw_inputs(ui);

            ui.add_space(10.0);
            ui.horizontal(|ui| {
                self.draw_tab_bar(ui);
            });

            if let Some(error) = &self.error_message {
                ui.colored_label(Color32::RED, error.as_str());
            }
            if let Some(success) = &self.success_message {
                ui.colored_label(Color32::GREEN, success.as_str());
            }

            ui.add_space(10.0);
            egui::ScrollArea::vertical().show(ui, |ui| match self.selected_tab {
                Tab::Surface => self.draw_surface(ui),
                Tab::Pireps => self.draw_pireps(ui),
                Tab::Summary => self.draw_summary(ui),
                Tab::SavedSites => self.draw_saved_sites(ui),
            });
        });
    }
}

impl DroneWxApp {
    fn draw_header(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(10.0);
            ui.heading(RichText::new("Drone Wx Profile").color(CYAN_GLOW).size(32.0));
            ui.label(RichText::new("METAR/SPECI + PIREPs").color(MAGENTA_GLOW).size(16.0));
            ui.label(
                RichText::new(format!("v{}", env!("CARGO_PKG_VERSION")))
                    .color(TEXT_COLOR)
                    .size(14.0)
            );
            ui.add_space(10.0);
        });
    }

    fn draw_inputs(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label("Nearby airport ICAO (METAR/SPECI):");
                ui.text_edit_singleline(&mut self.input_station);
            });
            ui.horizontal(|ui| {
                ui.label("Launch lat:");
                ui.add(egui::DragValue::new(&mut self.input_lat).speed(0.001).max_decimals(4));
                ui.label("lon:");
                ui.add(egui::DragValue::new(&mut self.input_lon).speed(0.001).max_decimals(4));
            });
            ui.add(
                egui::Slider::new(&mut self.radius_nm, RADIUS_RANGE_NM)
                    .step_by(1.0)
                    .text("PIREP radius (NM)"),
            );
            ui.add(egui::Slider::new(&mut self.metar_hours, LOOKBACK_RANGE_HOURS).text("METAR lookback (hours)"));
            ui.add(egui::Slider::new(&mut self.pirep_hours, LOOKBACK_RANGE_HOURS).text("PIREP lookback (hours)"));

            ui.horizontal(|ui| {
                if ui.button("Refresh").clicked() {
                    self.refresh();
                }
                if ui.button("Save as defaults").clicked() {
                    self.save_defaults();
                }
            });
        });
    }

    fn draw_tab_bar(&mut self, ui: &mut egui::Ui) {
        let tab_height = 30.0;
        let tab_padding = Vec2::new(20.0, 5.0);

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 1.0;

            for tab in [Tab::Surface, Tab::Pireps, Tab::Summary, Tab::SavedSites] {
                let is_selected = self.selected_tab == tab;
                let text = match tab {
                    Tab::Surface => "Surface (METAR/SPECI)",
                    Tab::Pireps => "PIREPs",
                    Tab::Summary => "Combined Summary",
                    Tab::SavedSites => "Saved Sites",
                };

                let button = egui::Button::new(
                    RichText::new(text)
                        .color(if is_selected { MAGENTA_GLOW } else { CYAN_GLOW })
                )
                .fill(if is_selected { Color32::from_rgb(40, 40, 40) } else { Color32::BLACK });

                let frame = egui::Frame::none()
                    .fill(if is_selected { TAB_ACTIVE } else { TAB_INACTIVE })
                    .inner_margin(tab_padding)
                    .show(ui, |ui| {
                        ui.add_sized(Vec2::new(0.0, tab_height), button)
                    });

                if frame.inner.clicked() {
                    self.selected_tab = tab;
                }
            }
        });
    }

    fn current_query(&self) -> Option<SiteQuery> {
        validate_lat_lon(self.input_lat, self.input_lon).ok()?;
        Some(SiteQuery {
            station: self.input_station.trim().to_uppercase(),
            latitude: self.input_lat,
            longitude: self.input_lon,
            radius_nm: self.radius_nm,
            metar_hours: self.metar_hours,
            pirep_hours: self.pirep_hours,
        })
    }

    fn refresh(&mut self) {
        self.error_message = None;
        self.success_message = None;

        let Some(query) = self.current_query() else {
            self.error_message = Some("Invalid latitude/longitude values".to_string());
            return;
        };

        let mut problems = Vec::new();
        match fetch_metar_rows(&self.source, &query) {
            Ok(rows) => self.metar_rows = rows,
            Err(e) => {
                self.metar_rows.clear();
                problems.push(format!("METAR fetch failed: {}", e));
            }
        }
        match fetch_pirep_rows(&self.source, &query) {
            Ok(rows) => self.pirep_rows = rows,
            Err(e) => {
                self.pirep_rows.clear();
                problems.push(format!("PIREP fetch failed: {}", e));
            }
        }
        self.summary = Some(build_summary(&self.source, &query));

        if problems.is_empty() {
            self.success_message = Some(format!(
                "{} METARs, {} PIREPs",
                self.metar_rows.len(),
                self.pirep_rows.len()
            ));
        } else {
            self.error_message = Some(problems.join("\n"));
        }
    }

    fn apply_inputs_to_config(&mut self) {
        self.config.station = self.input_station.trim().to_uppercase();
        self.config.latitude = self.input_lat;
        self.config.longitude = self.input_lon;
        self.config.radius_nm = self.radius_nm;
        self.config.metar_hours = self.metar_hours;
        self.config.pirep_hours = self.pirep_hours;
    }

    fn save_defaults(&mut self) {
        self.error_message = None;
        self.success_message = None;
        self.apply_inputs_to_config();
        match save_config(&self.config_path, &self.config) {
            Ok(()) => self.success_message = Some("Defaults saved".to_string()),
            Err(e) => self.error_message = Some(e.user_message()),
        }
    }

    fn draw_surface(&mut self, ui: &mut egui::Ui) {
        ui.heading(RichText::new("Surface (METAR/SPECI)").color(CYAN_GLOW));

        if let Some(latest) = self.metar_rows.first() {
            ui.horizontal(|ui| {
                ui.label("Latest flight category:");
                ui.label(
                    RichText::new(latest.category.as_str())
                        .color(category_color(latest.category))
                        .size(22.0)
                        .strong(),
                );
            });
            ui.code(latest.raw.as_str());
        }

        egui::Grid::new("metar_table").striped(true).show(ui, |ui| {
            for header in ["Observed", "Category", "Ceiling ft", "Vis SM", "Raw"] {
                ui.label(RichText::new(header).color(MAGENTA_GLOW));
            }
            ui.end_row();

            for row in &self.metar_rows {
                ui.label(row.observed.clone().unwrap_or_default());
                ui.colored_label(category_color(row.category), row.category.as_str());
                ui.label(display_ceiling(row.ceiling_ft));
                ui.label(display_visibility(row.visibility_sm));
                ui.label(RichText::new(&row.raw).monospace().color(TEXT_COLOR));
                ui.end_row();
            }
        });

        if !self.metar_rows.is_empty() && ui.button("Export CSV").clicked() {
            if let Some(path) = csv_save_dialog("metars.csv") {
                match save_metar_csv(&path, &self.metar_rows) {
                    Ok(()) => self.success_message = Some(format!("Saved {}", path.display())),
                    Err(e) => self.error_message = Some(e.user_message()),
                }
            }
        }
    }

    fn draw_pireps(&mut self, ui: &mut egui::Ui) {
        ui.heading(RichText::new("PIREPs (radius to bbox)").color(CYAN_GLOW));
        if let Some(query) = self.current_query() {
            ui.label(format!("bbox: {}", query.bbox()));
        }

        egui::Grid::new("pirep_table").striped(true).show(ui, |ui| {
            for header in ["Observed", "Bases (100 ft)", "Tops (100 ft)", "Raw"] {
                ui.label(RichText::new(header).color(MAGENTA_GLOW));
            }
            ui.end_row();

            for row in &self.pirep_rows {
                ui.label(row.observed.clone().unwrap_or_default());
                ui.label(join_heights(&row.bases));
                ui.label(join_heights(&row.tops));
                ui.label(RichText::new(&row.raw).monospace().color(TEXT_COLOR));
                ui.end_row();
            }
        });

        if !self.pirep_rows.is_empty() && ui.button("Export CSV").clicked() {
            if let Some(path) = csv_save_dialog("pireps.csv") {
                match save_pirep_csv(&path, &self.pirep_rows) {
                    Ok(()) => self.success_message = Some(format!("Saved {}", path.display())),
                    Err(e) => self.error_message = Some(e.user_message()),
                }
            }
        }
    }

    fn draw_summary(&mut self, ui: &mut egui::Ui) {
        ui.heading(RichText::new("Combined Summary").color(CYAN_GLOW));

        match &self.summary {
            Some(summary) => {
                if let Some(surface) = &summary.surface {
                    ui.label(
                        RichText::new(surface.category.as_str())
                            .color(category_color(surface.category))
                            .size(28.0)
                            .strong(),
                    );
                }
                for line in summary.lines() {
                    ui.label(RichText::new(line).color(TEXT_COLOR));
                }
            }
            None => {
                ui.label("Press Refresh to build a summary");
            }
        }

        ui.add_space(10.0);
        ui.label(
            RichText::new("AviationWeather.gov rate-limits its Data API; results are cached for a few minutes.")
                .italics()
                .size(12.0),
        );
    }

    fn draw_saved_sites(&mut self, ui: &mut egui::Ui) {
        ui.heading(RichText::new("Saved Sites").color(CYAN_GLOW));

        ui.horizontal(|ui| {
            ui.label("Name:");
            ui.text_edit_singleline(&mut self.new_site_name);
            if ui.button("Save current launch area").clicked() {
                self.save_current_site();
            }
        });

        if self.config.saved_sites.is_empty() {
            ui.label("No saved sites found");
            return;
        }

        let mut chosen: Option<SavedSite> = None;
        let mut deleted: Option<String> = None;
        for site in &self.config.saved_sites {
            ui.group(|ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(&site.name).color(TEXT_COLOR));
                    ui.label(format!("{} (Lat: {:.4}, Lon: {:.4})", site.station, site.latitude, site.longitude));
                    if ui.button("Use").clicked() {
                        chosen = Some(site.clone());
                    }
                    if ui.button("Delete").clicked() {
                        deleted = Some(site.name.clone());
                    }
                });
            });
        }

        if let Some(site) = chosen {
            self.input_station = site.station.clone();
            self.input_lat = site.latitude;
            self.input_lon = site.longitude;
            self.success_message = Some(format!("Using {}", site.name));
        }
        if let Some(name) = deleted {
            self.config.delete_site(&name);
            self.persist(format!("Deleted site {}", name));
        }
    }

    fn save_current_site(&mut self) {
        self.error_message = None;
        let site = SavedSite {
            name: self.new_site_name.clone(),
            station: self.input_station.clone(),
            latitude: self.input_lat,
            longitude: self.input_lon,
        };
        match self.config.save_site(site) {
            Ok(()) => {
                let name = std::mem::take(&mut self.new_site_name);
                self.persist(format!("Saved site {}", name.trim()));
            }
            Err(e) => self.error_message = Some(e.user_message()),
        }
    }

    fn persist(&mut self, success: String) {
        match save_config(&self.config_path, &self.config) {
            Ok(()) => self.success_message = Some(success),
            Err(e) => self.error_message = Some(e.user_message()),
        }
    }
}

fn category_color(category: FlightCategory) -> Color32 {
    match category {
        FlightCategory::Lifr => Color32::from_rgb(255, 0, 255),
        FlightCategory::Ifr => Color32::from_rgb(255, 60, 60),
        FlightCategory::Mvfr => Color32::from_rgb(60, 120, 255),
        FlightCategory::Vfr => Color32::from_rgb(0, 200, 80),
        FlightCategory::Unknown => Color32::GRAY,
    }
}

fn csv_save_dialog(file_name: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_file_name(file_name)
        .add_filter("CSV", &["csv"])
        .save_file()
}
