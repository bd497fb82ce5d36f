//! Main application state and update loop

use std::sync::{Arc, Mutex};
use std::time::Duration;

use eframe::egui;
use hype_presale_adapters::PresaleConfig;
use hype_presale_core::{
    project, resolve, resolve_by_chain_id, ConnectOutcome, ControllerSnapshot, Environment,
    NetworkType, StatusView, TransferKind,
};

use crate::bridge::{spawn_ui_task, PresaleBridge};
use crate::state::{countdown_parts, failure_text, NoticeTone, TaskOutcome, UiState};
use crate::ui;

/// The main application state
pub struct App {
    bridge: PresaleBridge,
    ui_state: UiState,
    /// Results posted by wallet tasks, drained every frame
    outcomes: Arc<Mutex<Vec<TaskOutcome>>>,
    environment: Environment,
    opened_at: web_time::Instant,
}

impl App {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = PresaleConfig::from_env();
        let bridge = PresaleBridge::with_config(&config);
        let environment = ui::detect_environment();
        tracing::info!(
            provider = bridge.provider_mode(),
            network = %config.default_network,
            mobile = environment.is_mobile,
            "presale shell ready"
        );

        Self {
            bridge,
            ui_state: UiState::default(),
            outcomes: Arc::new(Mutex::new(Vec::new())),
            environment,
            opened_at: web_time::Instant::now(),
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        self.check_task_outcomes();
        self.check_wallet_events();

        let snapshot = match self.bridge.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(error = %e, "controller state unavailable");
                return;
            }
        };
        let view = project(&snapshot, &self.ui_state.amount);
        let blocked = self.ui_state.current_notice().is_some() || self.ui_state.redirecting;

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.set_max_width(640.0);
                    ui.add_enabled_ui(!blocked, |ui| {
                        self.render_header(ui);
                        self.render_network(ui, ctx, &snapshot, &view);
                        self.render_amount(ui);
                        self.render_wallet(ui, ctx, &view);
                        self.render_actions(ui, ctx, &view);
                    });
                    self.render_addresses(ui, &view);
                    self.render_countdown(ui);
                    if self.environment.is_mobile && view.wallet_short.is_none() {
                        self.render_mobile_hint(ui);
                    }
                    self.render_footer(ui);
                });
            });
        });

        self.render_notice(ctx);

        // Wallet events and the countdown have no input of their own.
        ctx.request_repaint_after(Duration::from_millis(500));
    }
}

impl App {
    fn render_header(&self, ui: &mut egui::Ui) {
        ui.add_space(20.0);
        ui::styled_title(ui, "🚀 $HYPE PRESALE");
        ui.label(egui::RichText::new("Join the HyperEVM ecosystem early!").size(18.0));
        ui.add_space(10.0);
        ui.separator();
    }

    fn render_network(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        snapshot: &ControllerSnapshot,
        view: &StatusView,
    ) {
        ui.add_space(10.0);
        ui.horizontal(|ui| {
            let selected = snapshot.connection.selected_network;
            for network in NetworkType::ALL {
                let label = match network {
                    NetworkType::Mainnet => "Mainnet",
                    NetworkType::Testnet => "Testnet",
                };
                if ui.selectable_label(selected == network, label).clicked() && selected != network
                {
                    if let Err(e) = self.bridge.select_network(network) {
                        self.ui_state.push_error(e.to_string());
                    }
                }
            }
        });
        ui.add_space(6.0);
        ui::banner(ui, &view.network_banner, view.banner_tone);

        if view.switch_enabled {
            let target = resolve(snapshot.connection.selected_network);
            ui.add_space(4.0);
            if ui
                .button(format!("Switch wallet to {}", target.chain_name))
                .clicked()
            {
                self.start_switch(ctx);
            }
        }
    }

    fn render_amount(&mut self, ui: &mut egui::Ui) {
        ui.add_space(12.0);
        ui.label(egui::RichText::new("Amount (HYPE)").small());
        ui.add(
            egui::TextEdit::singleline(&mut self.ui_state.amount)
                .hint_text("Enter amount")
                .desired_width(f32::INFINITY)
                .font(egui::TextStyle::Monospace),
        );
    }

    fn render_wallet(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, view: &StatusView) {
        ui.add_space(12.0);
        let label = if view.wallet_short.is_some() {
            format!("✅ {}", view.connect_label)
        } else {
            format!("🔗 {}", view.connect_label)
        };
        if ui::wide_button(ui, &label, egui::Color32::from_rgb(21, 128, 61), view.connect_enabled) {
            self.start_connect(ctx);
        }

        if let Some(busy) = view.busy_label {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(busy);
            });
        } else if self.ui_state.awaiting.is_some() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Waiting for confirmation...");
            });
        }

        if let Some(wallet) = &view.wallet_short {
            ui.add_space(8.0);
            egui::Frame::none()
                .stroke(egui::Stroke::new(1.0, ui::ACCENT))
                .rounding(4.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new("Wallet:").strong());
                        ui.monospace(wallet);
                    });
                    if let Some(amount) = &view.pending_amount {
                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new("Amount:").strong());
                            ui.monospace(amount);
                        });
                    }
                });
        }
    }

    fn render_actions(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, view: &StatusView) {
        ui.add_space(12.0);
        ui.columns(2, |cols| {
            if ui::wide_button(
                &mut cols[0],
                "Buy HYPE",
                egui::Color32::from_rgb(37, 99, 235),
                view.purchase_enabled,
            ) {
                self.start_transfer(ctx, TransferKind::Purchase);
            }
            if ui::wide_button(
                &mut cols[1],
                "Bridge to HyperEVM",
                egui::Color32::from_rgb(147, 51, 234),
                view.bridge_enabled,
            ) {
                self.start_transfer(ctx, TransferKind::Bridge);
            }
        });
    }

    fn render_addresses(&self, ui: &mut egui::Ui, view: &StatusView) {
        ui.add_space(16.0);
        ui::copyable_address(ui, "Presale Address:", &view.purchase_recipient);
        ui.add_space(6.0);
        ui::copyable_address(ui, "HyperEVM Bridge Address:", &view.bridge_recipient);
    }

    fn render_countdown(&self, ui: &mut egui::Ui) {
        let elapsed = u64::try_from(self.opened_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        let (days, hours) = countdown_parts(elapsed);
        ui.add_space(12.0);
        ui.separator();
        ui.label(
            egui::RichText::new(format!("⏳ {days} Days    {hours} Hours"))
                .size(24.0)
                .color(ui::ACCENT),
        );
    }

    fn render_mobile_hint(&self, ui: &mut egui::Ui) {
        ui.add_space(10.0);
        for line in [
            "ℹ️ If MetaMask doesn't open automatically:",
            "1. Copy this page URL",
            "2. Open MetaMask app",
            "3. Paste URL in MetaMask browser",
        ] {
            ui.label(egui::RichText::new(line).small().color(ui::WARNING));
        }
    }

    fn render_footer(&self, ui: &mut egui::Ui) {
        ui.add_space(20.0);
        let hash = env!("GIT_HASH");
        let short = hash.get(..8).unwrap_or(hash);
        ui.label(
            egui::RichText::new(format!(
                "build {short} · {} · wallet: {}",
                env!("BUILD_TIME"),
                self.bridge.provider_mode()
            ))
            .small()
            .weak(),
        );
    }

    fn render_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.ui_state.current_notice().cloned() else {
            return;
        };
        let (title, color) = match notice.tone {
            NoticeTone::Info => ("Notice", ui::ACCENT),
            NoticeTone::Success => ("Success", ui::ACCENT),
            NoticeTone::Error => ("Error", ui::DANGER),
        };

        let mut dismissed = false;
        egui::Window::new(egui::RichText::new(title).color(color))
            .id(egui::Id::new("notice_modal"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.set_max_width(420.0);
                ui.label(&notice.message);
                if let Some(link) = &notice.link {
                    if ui.link("View on explorer").clicked() {
                        ui::open_url_new_tab(link);
                    }
                }
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.ui_state.dismiss_notice();
        }
    }
}

// Wallet tasks
impl App {
    fn start_connect(&mut self, ctx: &egui::Context) {
        let bridge = self.bridge.clone();
        let env = self.environment.clone();
        let sink = Arc::clone(&self.outcomes);
        let ctx = ctx.clone();
        spawn_ui_task(move || async move {
            let result = bridge.connect(&env).await;
            post(&sink, TaskOutcome::Connected(result));
            ctx.request_repaint();
        });
    }

    fn start_switch(&mut self, ctx: &egui::Context) {
        let bridge = self.bridge.clone();
        let sink = Arc::clone(&self.outcomes);
        let ctx = ctx.clone();
        spawn_ui_task(move || async move {
            let result = bridge.switch_network().await;
            post(&sink, TaskOutcome::Switched(result));
            ctx.request_repaint();
        });
    }

    /// Purchases are followed to confirmation; bridge transfers only report
    /// the sent hash.
    fn start_transfer(&mut self, ctx: &egui::Context, kind: TransferKind) {
        let bridge = self.bridge.clone();
        let amount = self.ui_state.amount.clone();
        let sink = Arc::clone(&self.outcomes);
        let ctx = ctx.clone();
        spawn_ui_task(move || async move {
            let result = bridge.submit(kind, &amount).await;
            let handle = result.as_ref().ok().cloned();
            post(&sink, TaskOutcome::Submitted { kind, result });
            ctx.request_repaint();

            if let (TransferKind::Purchase, Some(handle)) = (kind, handle) {
                let result = bridge.await_confirmation(&handle).await;
                post(&sink, TaskOutcome::Confirmed { handle, result });
                ctx.request_repaint();
            }
        });
    }

    fn check_task_outcomes(&mut self) {
        let outcomes = match self.outcomes.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(e) => {
                tracing::error!(error = %e, "task outcome lock poisoned");
                return;
            }
        };

        for outcome in outcomes {
            match outcome {
                TaskOutcome::Connected(Ok(ConnectOutcome::Connected { .. })) => {}
                TaskOutcome::Connected(Ok(ConnectOutcome::RedirectToWallet { url })) => {
                    ui::navigate_to(&url);
                    // The page unloads on web; a desktop build keeps running.
                    self.ui_state.redirecting = cfg!(target_arch = "wasm32");
                }
                TaskOutcome::Connected(Err(e)) => {
                    self.ui_state
                        .push_error(failure_text("Wallet connection", &e));
                }
                TaskOutcome::Switched(Ok(_)) => {}
                TaskOutcome::Switched(Err(e)) => {
                    self.ui_state.push_error(failure_text("Network switch", &e));
                }
                TaskOutcome::Submitted {
                    kind,
                    result: Ok(handle),
                } => {
                    let sent = match kind {
                        TransferKind::Purchase => "Transaction sent",
                        TransferKind::Bridge => "Bridging transaction sent",
                    };
                    let link = resolve_by_chain_id(handle.chain_id)
                        .map(|n| n.tx_explorer_url(&handle.tx_hash));
                    if kind == TransferKind::Purchase {
                        self.ui_state.awaiting = Some(handle.tx_hash);
                    }
                    self.ui_state
                        .push_info(format!("{sent}: {}", handle.tx_hash), link);
                }
                TaskOutcome::Submitted {
                    kind,
                    result: Err(e),
                } => {
                    self.ui_state.push_error(failure_text(kind.label(), &e));
                }
                TaskOutcome::Confirmed { handle, result } => {
                    if self.ui_state.awaiting == Some(handle.tx_hash) {
                        self.ui_state.awaiting = None;
                    }
                    match result {
                        Ok(record) => self.ui_state.push_success(
                            format!("Transaction confirmed in block {}", record.block_number),
                            resolve_by_chain_id(handle.chain_id)
                                .map(|n| n.tx_explorer_url(&record.tx_hash)),
                        ),
                        Err(e) => self.ui_state.push_error(failure_text("Transfer", &e)),
                    }
                }
            }
        }
    }

    fn check_wallet_events(&mut self) {
        match self.bridge.apply_provider_events() {
            Ok(summary) if summary.session_cleared => {
                self.ui_state
                    .push_info("Wallet disconnected. Connect again to continue.", None);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "failed to apply wallet events"),
        }
    }
}

fn post(sink: &Arc<Mutex<Vec<TaskOutcome>>>, outcome: TaskOutcome) {
    match sink.lock() {
        Ok(mut guard) => guard.push(outcome),
        Err(e) => tracing::error!(error = %e, "task outcome lock poisoned"),
    }
}
