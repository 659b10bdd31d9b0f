use std::time::Duration;

use client_core::{
    render::{render, ReadyScreen, Screen, StatCard, ViewAction},
    ViewState,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::backend_bridge::commands::{BackendCommand, LoadTrigger};
use crate::controller::{
    events::UiEvent,
    orchestration::{command_for_action, dispatch_backend_command},
};
use crate::ui::{
    plot::{show_plot_section, PlotCache},
    theme,
};

pub struct IncomeViewerApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    view_state: ViewState,
    worker_status: String,
    status_banner: Option<String>,
    plot_cache: PlotCache,
    theme_applied: bool,
}

impl IncomeViewerApp {
    /// Mounting the view queues the initial load.
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            view_state: ViewState::Loading,
            worker_status: "Backend worker pending".to_string(),
            status_banner: None,
            plot_cache: PlotCache::default(),
            theme_applied: false,
        };
        app.queue(BackendCommand::Load {
            trigger: LoadTrigger::Mount,
        });
        app
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view_state
    }

    pub fn status_banner(&self) -> Option<&str> {
        self.status_banner.as_deref()
    }

    pub fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::ViewStateChanged(state) => {
                    if !matches!(state, ViewState::Ready { .. }) {
                        self.plot_cache.clear();
                    }
                    self.view_state = state;
                }
                UiEvent::Info(message) => {
                    self.worker_status = message;
                }
                UiEvent::BackendFailure(message) => {
                    tracing::error!("{message}");
                    self.worker_status = "Backend worker unavailable".to_string();
                    self.status_banner = Some(message);
                }
            }
        }
    }

    fn queue(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status_banner);
    }

    fn perform(&mut self, action: ViewAction) {
        self.status_banner = None;
        self.queue(command_for_action(action));
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        let Some(message) = self.status_banner.clone() else {
            return;
        };
        theme::banner_frame().show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.label(egui::RichText::new(&message).color(egui::Color32::WHITE));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Dismiss").clicked() {
                        self.status_banner = None;
                    }
                });
            });
        });
        ui.add_space(8.0);
    }

    fn show_screen(&mut self, ui: &mut egui::Ui, screen: &Screen) -> Option<ViewAction> {
        match screen {
            Screen::Loading { label } => {
                ui.vertical_centered(|ui| {
                    ui.add_space(ui.available_height() * 0.35);
                    ui.spinner();
                    ui.label(*label);
                });
                None
            }
            Screen::Error {
                title,
                message,
                action,
            } => {
                let mut clicked = None;
                ui.vertical_centered(|ui| {
                    ui.add_space(ui.available_height() * 0.3);
                    ui.heading(*title);
                    ui.label(message);
                    ui.add_space(8.0);
                    if ui.button(action.label()).clicked() {
                        clicked = Some(*action);
                    }
                });
                clicked
            }
            Screen::Ready(ready) => self.show_ready(ui, ready),
        }
    }

    fn show_ready(&mut self, ui: &mut egui::Ui, ready: &ReadyScreen) -> Option<ViewAction> {
        let mut clicked = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(egui::RichText::new(ready.heading).size(26.0).strong());
                ui.label(ready.subtitle);
            });
            ui.add_space(12.0);

            ui.columns(ready.cards.len(), |columns| {
                for (column, card) in columns.iter_mut().zip(ready.cards.iter()) {
                    show_stat_card(column, card);
                }
            });
            ui.add_space(16.0);

            ui.heading(ready.top_majors_heading);
            ui.add_space(6.0);
            theme::card_frame().show(ui, |ui| {
                egui::Grid::new("top-majors")
                    .num_columns(3)
                    .striped(true)
                    .spacing([16.0, 6.0])
                    .show(ui, |ui| {
                        for row in &ready.top_majors {
                            ui.label(
                                egui::RichText::new(row.rank.to_string())
                                    .color(theme::ACCENT)
                                    .strong(),
                            );
                            ui.label(&row.major);
                            ui.label(&row.income);
                            ui.end_row();
                        }
                    });
            });
            ui.add_space(16.0);

            if let Some(section) = &ready.plot {
                show_plot_section(ui, &mut self.plot_cache, section);
                ui.add_space(16.0);
            }

            ui.vertical_centered(|ui| {
                if ui.button(ready.action.label()).clicked() {
                    clicked = Some(ready.action);
                }
            });
        });
        clicked
    }
}

fn show_stat_card(ui: &mut egui::Ui, card: &StatCard) {
    theme::card_frame().show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        ui.label(egui::RichText::new(card.title).weak());
        ui.label(egui::RichText::new(&card.value).size(22.0).strong());
    });
}

impl eframe::App for IncomeViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            ctx.set_visuals(theme::visuals());
            self.theme_applied = true;
        }

        self.process_ui_events();

        let screen = render(&self.view_state);
        egui::TopBottomPanel::bottom("worker-status").show(ctx, |ui| {
            ui.label(egui::RichText::new(&self.worker_status).small().weak());
        });
        let action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                self.show_status_banner(ui);
                self.show_screen(ui, &screen)
            })
            .inner;

        if let Some(action) = action {
            self.perform(action);
        }

        if self.view_state.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl Drop for IncomeViewerApp {
    fn drop(&mut self) {
        let _ = self.cmd_tx.try_send(BackendCommand::Shutdown);
    }
}
