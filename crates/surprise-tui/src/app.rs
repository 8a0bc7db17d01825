use std::sync::Arc;

use ratatui::layout::{Position, Rect};
use surprise_core::{
    Action, AiGateway, Config, ConfettiLoop, Controller, ProviderClient, Session, Stage,
};

/// Confetti surface units per terminal cell. Roughly the pixel size of a
/// cell, so the animator's speeds read the same as on a canvas.
pub const CELL_WIDTH: f64 = 8.0;
pub const CELL_HEIGHT: f64 = 16.0;

/// Rows taken by the header and the footer around the body.
pub const HEADER_ROWS: u16 = 1;
pub const FOOTER_ROWS: u16 = 1;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub session: Session<AiGateway>,
    pub gateway_label: String,

    // Confetti, running only while Celebration is on screen
    pub confetti: ConfettiLoop,

    // Welcome screen keyboard focus (index into the decoy field)
    pub focused_decoy: usize,

    // Reasons list scroll
    pub reasons_scroll: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Stage seen on the last sync, to notice transitions
    pub shown_stage: Stage,

    // Terminal size
    pub viewport: Rect,

    // Areas for mouse hit-testing (updated during render)
    pub decoy_areas: Vec<Rect>,
    pub control_areas: Vec<(Rect, Action)>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let gateway = match ProviderClient::from_config(config) {
            Ok(client) => AiGateway::new(client, &config.model()),
            Err(e) => {
                tracing::warn!(error = %e, "no usable text provider, wishes will use fallbacks");
                AiGateway::offline()
            }
        };
        Self::with_gateway(config, gateway)
    }

    pub fn with_gateway(config: &Config, gateway: AiGateway) -> Self {
        let gateway_label = gateway.describe();
        let controller = Controller::new(config.recipient());

        Self {
            should_quit: false,
            session: Session::new(controller, Arc::new(gateway)),
            gateway_label,
            confetti: ConfettiLoop::new(),
            focused_decoy: 0,
            reasons_scroll: 0,
            animation_frame: 0,
            shown_stage: Stage::Welcome,
            viewport: Rect::default(),
            decoy_areas: Vec::new(),
            control_areas: Vec::new(),
        }
    }

    pub fn controller(&self) -> &Controller {
        self.session.controller()
    }

    pub fn stage(&self) -> Stage {
        self.controller().stage()
    }

    pub fn dispatch(&mut self, action: Action) {
        self.session.dispatch(action);
        self.sync_stage();
    }

    /// One frame: advance confetti, pick up finished fetches, run the click
    /// budget watcher.
    pub async fn tick(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 3;
        self.confetti.tick();
        self.session.poll().await;
        self.session.watch();
        self.sync_stage();
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport = Rect::new(0, 0, width, height);
        let (w, h) = confetti_surface(self.viewport);
        self.confetti.resize(w, h);
    }

    /// Start or stop the screen-bound extras after a stage change.
    fn sync_stage(&mut self) {
        let stage = self.stage();
        if stage == self.shown_stage {
            return;
        }
        self.shown_stage = stage;
        self.focused_decoy = 0;
        self.reasons_scroll = 0;

        if stage == Stage::Celebration {
            let (w, h) = confetti_surface(self.viewport);
            self.confetti.start(w, h);
        } else {
            self.confetti.stop();
        }
    }

    /// What a left click at this cell means.
    pub fn action_at(&self, column: u16, row: u16) -> Action {
        let position = Position::new(column, row);
        // Decoys float above the card, so they win.
        if let Some(index) = self
            .decoy_areas
            .iter()
            .rposition(|area| area.contains(position))
        {
            return Action::PressDecoy(index);
        }
        self.control_areas
            .iter()
            .find(|(area, _)| area.contains(position))
            .map(|(_, action)| *action)
            .unwrap_or(Action::StrayClick)
    }

    pub fn focus_next_decoy(&mut self) {
        let len = self.controller().decoys().len();
        if len > 0 {
            self.focused_decoy = (self.focused_decoy + 1) % len;
        }
    }

    pub fn focus_prev_decoy(&mut self) {
        let len = self.controller().decoys().len();
        if len > 0 {
            self.focused_decoy = (self.focused_decoy + len - 1) % len;
        }
    }

    pub fn press_focused_decoy(&mut self) {
        self.dispatch(Action::PressDecoy(self.focused_decoy));
    }

    pub fn scroll_reasons_down(&mut self) {
        let max = self.controller().reasons().len().saturating_sub(1) as u16;
        self.reasons_scroll = (self.reasons_scroll + 1).min(max);
    }

    pub fn scroll_reasons_up(&mut self) {
        self.reasons_scroll = self.reasons_scroll.saturating_sub(1);
    }

    pub fn ellipsis(&self) -> &'static str {
        match self.animation_frame {
            0 => ".",
            1 => "..",
            _ => "...",
        }
    }
}

/// The part of the screen between the header and the footer.
pub fn body_area(viewport: Rect) -> Rect {
    let height = viewport.height.saturating_sub(HEADER_ROWS + FOOTER_ROWS);
    Rect::new(viewport.x, viewport.y + HEADER_ROWS.min(viewport.height), viewport.width, height)
}

/// Confetti surface size for a terminal of this size. Confetti falls through
/// the body only.
pub fn confetti_surface(viewport: Rect) -> (f64, f64) {
    let body = body_area(viewport);
    (
        f64::from(body.width) * CELL_WIDTH,
        f64::from(body.height) * CELL_HEIGHT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use surprise_core::{WishTone, MAX_CLICKS_PER_STAGE};

    fn app() -> App {
        let mut app = App::with_gateway(&Config::new(), AiGateway::offline());
        app.resize(80, 24);
        app
    }

    fn press_real(app: &mut App) {
        let real = app.controller().decoys().real_index().unwrap();
        app.dispatch(Action::PressDecoy(real));
    }

    #[tokio::test]
    async fn test_confetti_runs_only_on_celebration() {
        let mut app = app();
        press_real(&mut app);
        app.dispatch(Action::Next);
        app.dispatch(Action::ShowMore);
        app.dispatch(Action::Continue);
        assert!(!app.confetti.is_running());

        app.dispatch(Action::LetsParty);
        assert_eq!(app.stage(), Stage::Celebration);
        assert!(app.confetti.is_running());
        // 80x24 terminal, 22 body rows
        assert_eq!(app.confetti.confetti().unwrap().size(), (640.0, 352.0));

        app.dispatch(Action::ChooseTone(WishTone::Funny));
        assert!(!app.confetti.is_running());

        app.dispatch(Action::Back);
        assert!(app.confetti.is_running());
        app.dispatch(Action::OneMoreThing);
        assert!(!app.confetti.is_running());
    }

    #[tokio::test]
    async fn test_offline_wish_arrives_on_tick() {
        let mut app = app();
        press_real(&mut app);
        app.dispatch(Action::Next);
        app.dispatch(Action::ShowMore);
        app.dispatch(Action::Continue);
        app.dispatch(Action::LetsParty);
        app.dispatch(Action::ChooseTone(WishTone::Funny));
        assert!(app.controller().is_loading_wish());

        for _ in 0..20 {
            if !app.controller().is_loading_wish() {
                break;
            }
            tokio::task::yield_now().await;
            app.tick().await;
        }
        assert!(!app.controller().is_loading_wish());
        assert!(!app.controller().ai_wish().is_empty());
        assert_eq!(app.controller().wish_type(), WishTone::Funny);
    }

    #[tokio::test]
    async fn test_tick_runs_budget_watcher() {
        let mut app = app();
        press_real(&mut app);
        for _ in 0..MAX_CLICKS_PER_STAGE {
            app.dispatch(Action::StrayClick);
        }
        app.tick().await;
        assert_eq!(app.stage(), Stage::Fact);
    }

    #[test]
    fn test_body_area_excludes_header_and_footer() {
        assert_eq!(body_area(Rect::new(0, 0, 80, 24)), Rect::new(0, 1, 80, 22));
        assert_eq!(body_area(Rect::new(0, 0, 80, 1)).height, 0);
        assert_eq!(confetti_surface(Rect::new(0, 0, 100, 30)), (800.0, 448.0));
    }

    #[test]
    fn test_action_at_prefers_decoys_then_controls() {
        let mut app = app();
        app.control_areas = vec![(Rect::new(10, 10, 10, 1), Action::Next)];
        app.decoy_areas = vec![Rect::new(0, 0, 5, 1), Rect::new(12, 10, 4, 1)];

        assert_eq!(app.action_at(1, 0), Action::PressDecoy(0));
        assert_eq!(app.action_at(13, 10), Action::PressDecoy(1));
        assert_eq!(app.action_at(18, 10), Action::Next);
        assert_eq!(app.action_at(40, 20), Action::StrayClick);
    }

    #[test]
    fn test_decoy_focus_wraps() {
        let mut app = app();
        let len = app.controller().decoys().len();
        app.focus_prev_decoy();
        assert_eq!(app.focused_decoy, len - 1);
        app.focus_next_decoy();
        assert_eq!(app.focused_decoy, 0);
    }
}
