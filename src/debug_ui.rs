// Scatter-plot collector + viewer.
//
// Callers drop in `add_scatter()` calls anywhere and a single `show()` at the
// end opens one window listing everything collected.
//
// When the `viz` feature is disabled (or `cli_only` is enabled), all APIs
// in this module become no-ops.

#[cfg(all(feature = "viz", not(feature = "cli_only")))]
mod imp {
    use eframe::egui;
    use std::sync::{Mutex, OnceLock, PoisonError};

    /// Above this many points a viewer draws every n-th point only.
    const MAX_DRAWN_POINTS: usize = 50_000;

    #[derive(Clone, Debug)]
    struct ScatterData {
        title: String,
        points: Vec<[f64; 3]>,
    }

    #[derive(Default)]
    struct DebugUiState {
        title: String,
        items: Vec<ScatterData>,
    }

    fn global_state() -> &'static Mutex<DebugUiState> {
        static G: OnceLock<Mutex<DebugUiState>> = OnceLock::new();
        G.get_or_init(|| {
            Mutex::new(DebugUiState {
                title: "regionstats".to_owned(),
                items: Vec::new(),
            })
        })
    }

    // Public API (collector)
    // -------------------------------------------------------------------------

    pub fn init(title: &str) {
        let mut g = global_state().lock().unwrap_or_else(PoisonError::into_inner);
        g.title = title.to_owned();
        g.items.clear();
    }

    pub fn add_scatter(title: &str, points: &[[f64; 3]]) {
        let mut g = global_state().lock().unwrap_or_else(PoisonError::into_inner);
        g.items.push(ScatterData {
            title: title.to_owned(),
            points: points.to_vec(),
        });
    }

    /// Opens the window and blocks until it is closed. Does nothing if nothing was collected.
    pub fn show() -> Result<(), String> {
        let (title, items) = {
            let mut g = global_state().lock().unwrap_or_else(PoisonError::into_inner);
            let title = g.title.clone();
            let items = std::mem::take(&mut g.items);
            (title, items)
        };
        if items.is_empty() {
            return Ok(());
        }

        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default().with_inner_size(egui::vec2(1200.0, 800.0)),
            ..Default::default()
        };
        let window_title = title.clone();

        eframe::run_native(
            &window_title,
            options,
            Box::new(move |_cc| Ok(Box::new(DebugUiApp::new(&title, items)))),
        )
        .map_err(|e| e.to_string())
    }

    // Window
    // -------------------------------------------------------------------------

    struct DebugUiApp {
        title: String,
        items: Vec<ScatterViewer>,
        selected: usize,
    }

    impl DebugUiApp {
        fn new(title: &str, items: Vec<ScatterData>) -> Self {
            Self {
                title: title.to_owned(),
                items: items
                    .into_iter()
                    .map(|d| ScatterViewer::new(&d.title, &d.points))
                    .collect(),
                selected: 0,
            }
        }
    }

    impl eframe::App for DebugUiApp {
        fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
            egui::TopBottomPanel::top("top").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(&self.title);
                    ui.separator();
                    ui.monospace(format!("items={}", self.items.len()));
                });
            });

            egui::SidePanel::left("left")
                .resizable(true)
                .default_width(260.0)
                .show(ctx, |ui| {
                    ui.heading("Scatter Plots");
                    ui.separator();
                    for (i, v) in self.items.iter().enumerate() {
                        let label = format!("{} ({} pts)", v.title, v.n_points);
                        if ui.selectable_label(i == self.selected, label).clicked() {
                            self.selected = i;
                        }
                    }
                });

            egui::CentralPanel::default().show(ctx, |ui| {
                let i = self.selected.min(self.items.len().saturating_sub(1));
                match self.items.get_mut(i) {
                    Some(v) => v.ui(ui),
                    None => {
                        ui.label("No selection");
                    }
                }
            });
        }
    }

    // Scatter viewer component
    // -------------------------------------------------------------------------

    struct ScatterViewer {
        title: String,
        n_points: usize,
        lo: [f64; 3],
        hi: [f64; 3],
        // Centered on the bounding box and scaled into [-1, 1].
        unit_points: Vec<[f32; 3]>,
        yaw: f32,
        pitch: f32,
        zoom: f32,
    }

    impl ScatterViewer {
        fn new(title: &str, points: &[[f64; 3]]) -> Self {
            let mut lo = [f64::INFINITY; 3];
            let mut hi = [f64::NEG_INFINITY; 3];
            for p in points {
                for axis in 0..3 {
                    if p[axis].is_finite() {
                        lo[axis] = lo[axis].min(p[axis]);
                        hi[axis] = hi[axis].max(p[axis]);
                    }
                }
            }
            for axis in 0..3 {
                if lo[axis] > hi[axis] {
                    lo[axis] = 0.0;
                    hi[axis] = 0.0;
                }
            }

            let center = [0usize, 1, 2].map(|a| 0.5 * (lo[a] + hi[a]));
            let half = (0..3usize)
                .map(|a| 0.5 * (hi[a] - lo[a]))
                .fold(0.0_f64, f64::max);
            let half = if half > 0.0 { half } else { 1.0 };

            let stride = points.len().div_ceil(MAX_DRAWN_POINTS).max(1);
            let unit_points = points
                .iter()
                .step_by(stride)
                .filter(|p| p.iter().all(|v| v.is_finite()))
                .map(|p| [0usize, 1, 2].map(|a| ((p[a] - center[a]) / half) as f32))
                .collect();

            Self {
                title: title.to_owned(),
                n_points: points.len(),
                lo,
                hi,
                unit_points,
                yaw: 0.6,
                pitch: 0.4,
                zoom: 1.0,
            }
        }

        /// Returns (screen x, screen up, depth toward the viewer).
        fn rotate(&self, p: [f32; 3]) -> (f32, f32, f32) {
            let (sy, cy) = self.yaw.sin_cos();
            let (sp, cp) = self.pitch.sin_cos();
            let x1 = p[0] * cy - p[1] * sy;
            let y1 = p[0] * sy + p[1] * cy;
            let y2 = y1 * cp - p[2] * sp;
            let z2 = y1 * sp + p[2] * cp;
            (x1, z2, y2)
        }

        fn ui(&mut self, ui: &mut egui::Ui) {
            ui.horizontal(|ui| {
                ui.label(&self.title);
                ui.separator();
                ui.monospace(format!(
                    "x=[{:.3}, {:.3}] y=[{:.3}, {:.3}] z=[{:.3}, {:.3}]",
                    self.lo[0], self.hi[0], self.lo[1], self.hi[1], self.lo[2], self.hi[2]
                ));
                ui.separator();
                ui.monospace("drag: rotate | scroll: zoom");
            });

            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;

            let drag = response.drag_delta();
            self.yaw += drag.x * 0.01;
            self.pitch = (self.pitch + drag.y * 0.01).clamp(-1.5, 1.5);
            if response.hovered() {
                let scroll = ui.input(|i| i.smooth_scroll_delta.y);
                self.zoom = (self.zoom * (1.0 + scroll * 0.002)).clamp(0.1, 20.0);
            }

            painter.rect_filled(rect, 0.0, egui::Color32::from_gray(16));

            let scale = 0.4 * rect.width().min(rect.height()) * self.zoom;
            let to_screen = |sx: f32, sy: f32| rect.center() + egui::vec2(sx * scale, -sy * scale);

            // Axes from the box center: x red, y green, z blue.
            let axes = [
                ([1.0, 0.0, 0.0], egui::Color32::from_rgb(200, 60, 60)),
                ([0.0, 1.0, 0.0], egui::Color32::from_rgb(60, 200, 60)),
                ([0.0, 0.0, 1.0], egui::Color32::from_rgb(80, 120, 230)),
            ];
            for (dir, color) in axes {
                let (sx, sy, _) = self.rotate(dir);
                painter.line_segment([to_screen(0.0, 0.0), to_screen(sx, sy)], egui::Stroke::new(1.5, color));
            }

            let mut projected: Vec<(f32, egui::Pos2)> = self
                .unit_points
                .iter()
                .map(|&p| {
                    let (sx, sy, depth) = self.rotate(p);
                    (depth, to_screen(sx, sy))
                })
                .collect();
            // Far points first so near ones paint over them.
            projected.sort_by(|a, b| a.0.total_cmp(&b.0));

            for (depth, pos) in projected {
                if !rect.contains(pos) {
                    continue;
                }
                let t = ((depth + 1.8) / 3.6).clamp(0.0, 1.0);
                let shade = (90.0 + 165.0 * t) as u8;
                painter.circle_filled(pos, 1.5, egui::Color32::from_rgb(shade / 3, shade / 2, shade));
            }
        }
    }
}

/// No-op implementations when the viz feature is disabled or cli_only is enabled.
#[cfg(not(all(feature = "viz", not(feature = "cli_only"))))]
mod imp {
    pub fn init(_title: &str) {}

    pub fn add_scatter(_title: &str, _points: &[[f64; 3]]) {}

    pub fn show() -> Result<(), String> {
        Ok(())
    }
}

pub use imp::*;
