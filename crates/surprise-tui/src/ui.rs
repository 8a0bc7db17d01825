use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Widget, Wrap},
};
use surprise_core::{Action, Confetti, Stage, WishTone, MAX_CLICKS_PER_STAGE};

use crate::app::{App, CELL_HEIGHT, CELL_WIDTH, FOOTER_ROWS, HEADER_ROWS};
use crate::copy;

const BACKGROUND: Color = Color::Rgb(36, 18, 44);
const CARD: Color = Color::Rgb(52, 28, 62);
const TEXT: Color = Color::Rgb(236, 228, 240);
const MUTED: Color = Color::Rgb(150, 135, 160);
const PINK: Color = Color::Rgb(236, 72, 153);
const PURPLE: Color = Color::Rgb(147, 51, 234);
const INDIGO: Color = Color::Rgb(99, 102, 241);
const ORANGE: Color = Color::Rgb(234, 88, 12);
const ROSE: Color = Color::Rgb(244, 63, 94);

/// A clickable control: label, what it does, its colour.
type Button<'a> = (&'a str, Action, Color);

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Hit areas are rebuilt every frame
    app.decoy_areas.clear();
    app.control_areas.clear();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(HEADER_ROWS),
        Constraint::Min(0),
        Constraint::Length(FOOTER_ROWS),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    frame.render_widget(Block::default().style(Style::default().bg(BACKGROUND)), body_area);

    match app.stage() {
        Stage::Welcome => render_welcome(app, frame, body_area),
        Stage::Roast => render_roast(app, frame, body_area),
        Stage::Fact => render_fact(app, frame, body_area),
        Stage::Reasons => render_reasons(app, frame, body_area),
        Stage::Shayari => render_shayari(app, frame, body_area),
        Stage::Celebration => render_celebration(app, frame, body_area),
        Stage::Impact => render_impact(app, frame, body_area),
        Stage::AiWish => render_ai_wish(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let recipient = app.controller().recipient();
    let title = Line::from(vec![
        Span::styled(" ♥ ", Style::default().fg(PINK)),
        Span::styled(
            format!("A surprise for {} ", recipient.name),
            Style::default().fg(Color::White).bold(),
        ),
        Span::styled(
            format!(" {} ", app.gateway_label),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let keys: Vec<(&str, &str)> = match app.stage() {
        Stage::Welcome => vec![("Tab", "next button"), ("Enter", "press"), ("click", "catch it")],
        Stage::Roast => vec![("n", "next fact")],
        Stage::Fact => vec![("m", "show me more")],
        Stage::Reasons => vec![("j/k", "scroll"), ("c", "continue")],
        Stage::Shayari => vec![("p", "let's party")],
        Stage::Celebration => vec![
            ("1", "heartfelt"),
            ("2", "funny"),
            ("3", "roast"),
            ("o", "one more thing"),
        ],
        Stage::AiWish if app.controller().is_loading_wish() => vec![("b", "back")],
        Stage::AiWish => vec![("g", "regenerate"), ("b", "back")],
        Stage::Impact => vec![("r", "back to start")],
    };

    let mut hints: Vec<Span> = keys
        .into_iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(format!(" {} ", key), key_style),
                Span::styled(format!(" {} ", label), label_style),
            ]
        })
        .collect();
    hints.extend([
        Span::styled(" q ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn render_welcome(app: &mut App, frame: &mut Frame, area: Rect) {
    let controller = app.controller();
    let name = controller.recipient().name.clone();
    let clicks = controller.click_count();

    let inner = render_card(frame, area, 60, 12, PINK);
    let lines = vec![
        Line::from(Span::styled("🎂", Style::default())).alignment(Alignment::Center),
        Line::default(),
        Line::from(Span::styled(
            copy::welcome_title(&name),
            Style::default().fg(PINK).bold(),
        ))
        .alignment(Alignment::Center),
        Line::default(),
        Line::from(Span::styled(copy::WELCOME_BODY, Style::default().fg(TEXT)))
            .alignment(Alignment::Center),
        Line::default(),
        Line::from(Span::styled(
            format!("Clicks used: {} / {}", clicks, MAX_CLICKS_PER_STAGE),
            Style::default().fg(MUTED).italic(),
        ))
        .alignment(Alignment::Center),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

    render_decoys(app, frame, area);
}

/// Floating prank buttons, drawn over the whole body.
fn render_decoys(app: &mut App, frame: &mut Frame, area: Rect) {
    let mut areas = Vec::new();

    for (i, button) in app.controller().decoys().buttons().iter().enumerate() {
        // Bigger buttons get more padding.
        let pad = if button.scale >= 1.0 { "  " } else { " " };
        let label = format!("{}{}{}", pad, button.label(), pad);
        let rect = decoy_rect(area, button.x, button.y, Line::from(label.as_str()).width() as u16);

        let style = if i == app.focused_decoy {
            Style::default().bg(Color::Yellow).fg(Color::Black).bold()
        } else {
            Style::default().bg(PINK).fg(Color::White).bold()
        };
        frame.render_widget(Paragraph::new(label).style(style), rect);
        areas.push(rect);
    }

    app.decoy_areas = areas;
}

/// One-row rect for a button centred on a percentage position, kept inside `area`.
pub fn decoy_rect(area: Rect, x_pct: f64, y_pct: f64, width: u16) -> Rect {
    let width = width.min(area.width);
    let center_x = area.x as f64 + area.width as f64 * x_pct / 100.0;
    let center_y = area.y as f64 + area.height as f64 * y_pct / 100.0;

    let max_x = area.right().saturating_sub(width);
    let x = (center_x - width as f64 / 2.0).round().max(area.x as f64) as u16;
    let y = (center_y.floor() as u16).min(area.bottom().saturating_sub(1));

    Rect::new(x.min(max_x), y.max(area.y), width, 1.min(area.height))
}

fn render_roast(app: &mut App, frame: &mut Frame, area: Rect) {
    let name = app.controller().recipient().name.clone();
    let inner = render_card(frame, area, 64, 14, PURPLE);
    let [text_area, _, buttons_area] = card_rows(inner);

    let lines = vec![
        Line::from(Span::styled("❝", Style::default().fg(PURPLE))).alignment(Alignment::Center),
        Line::default(),
        Line::from(Span::styled(copy::roast_setup(&name), Style::default().fg(TEXT).bold()))
            .alignment(Alignment::Center),
        Line::default(),
        Line::from(Span::styled(
            copy::ROAST_PUNCHLINE,
            Style::default().fg(PURPLE).add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), text_area);

    render_buttons(app, frame, buttons_area, &[("Okay, next fact! ›", Action::Next, Color::DarkGray)]);
}

fn render_fact(app: &mut App, frame: &mut Frame, area: Rect) {
    let inner = render_card(frame, area, 64, 14, INDIGO);
    let [text_area, _, buttons_area] = card_rows(inner);

    let lines = vec![
        Line::from(Span::styled("☾", Style::default().fg(INDIGO))).alignment(Alignment::Center),
        Line::default(),
        Line::from(Span::styled(copy::FACT_SETUP, Style::default().fg(TEXT)))
            .alignment(Alignment::Center),
        Line::default(),
        Line::from(Span::styled(
            copy::FACT_PUNCHLINE,
            Style::default().fg(ROSE).add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ))
        .alignment(Alignment::Center),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), text_area);

    render_buttons(app, frame, buttons_area, &[("Show me more", Action::ShowMore, INDIGO)]);
}

fn render_reasons(app: &mut App, frame: &mut Frame, area: Rect) {
    let controller = app.controller();
    let age = controller.recipient().age;

    let width = area.width.saturating_sub(4).min(90);
    let height = area.height.saturating_sub(2);
    let inner = render_card(frame, area, width, height, ORANGE);
    let [title_area, list_area, _, buttons_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            copy::reasons_title(age),
            Style::default().fg(TEXT).bold(),
        )))
        .alignment(Alignment::Center),
        title_area,
    );

    let body = if controller.is_loading_reasons() {
        Paragraph::new(Line::from(Span::styled(
            format!("Gathering reasons{}", app.ellipsis()),
            Style::default().fg(MUTED).italic(),
        )))
        .alignment(Alignment::Center)
    } else {
        let lines: Vec<Line> = controller
            .reasons()
            .iter()
            .enumerate()
            .map(|(i, reason)| {
                Line::from(vec![
                    Span::styled(format!("#{:<3} ", i + 1), Style::default().fg(MUTED).bold()),
                    Span::styled(reason.clone(), Style::default().fg(TEXT)),
                ])
            })
            .collect();
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .scroll((app.reasons_scroll, 0))
    };
    frame.render_widget(body, list_area);

    render_buttons(app, frame, buttons_area, &[("Almost done...", Action::Continue, ORANGE)]);
}

fn render_shayari(app: &mut App, frame: &mut Frame, area: Rect) {
    let inner = render_card(frame, area, 56, 14, ORANGE);
    let [text_area, _, buttons_area] = card_rows(inner);

    let verse = Style::default().fg(TEXT).add_modifier(Modifier::BOLD | Modifier::ITALIC);
    let mut lines = vec![
        Line::from(Span::styled("✿", Style::default().fg(ORANGE))).alignment(Alignment::Center),
        Line::default(),
    ];
    for (i, line) in copy::SHAYARI.iter().enumerate() {
        if i == 2 {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(*line, verse)).alignment(Alignment::Center));
    }
    frame.render_widget(Paragraph::new(lines), text_area);

    render_buttons(app, frame, buttons_area, &[("Let's Party! 🎉", Action::LetsParty, ORANGE)]);
}

fn render_celebration(app: &mut App, frame: &mut Frame, area: Rect) {
    if let Some(confetti) = app.confetti.confetti() {
        frame.render_widget(ConfettiLayer { confetti }, area);
    }

    let recipient = app.controller().recipient().clone();
    let inner = render_card(frame, area, 64, 14, PINK);
    let [text_area, _, tones_area, _, more_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let lines = vec![
        Line::from(Span::styled("♥", Style::default().fg(Color::Red).bold()))
            .alignment(Alignment::Center),
        Line::default(),
        Line::from(Span::styled(
            copy::celebration_title(&recipient.name),
            Style::default().fg(PINK).bold(),
        ))
        .alignment(Alignment::Center),
        Line::default(),
        Line::from(Span::styled(
            copy::celebration_body(recipient.age),
            Style::default().fg(TEXT),
        ))
        .alignment(Alignment::Center),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), text_area);

    let tone_labels: Vec<String> = WishTone::all()
        .iter()
        .enumerate()
        .map(|(i, tone)| format!("{} {}", i + 1, tone.display_name()))
        .collect();
    let tone_colors = [PINK, PURPLE, ORANGE];
    let tone_buttons: Vec<Button> = WishTone::all()
        .into_iter()
        .zip(&tone_labels)
        .zip(tone_colors)
        .map(|((tone, label), color)| (label.as_str(), Action::ChooseTone(tone), color))
        .collect();
    render_buttons(app, frame, tones_area, &tone_buttons);

    render_buttons(
        app,
        frame,
        more_area,
        &[("♡ Wait, one more thing...", Action::OneMoreThing, ROSE)],
    );
}

fn render_impact(app: &mut App, frame: &mut Frame, area: Rect) {
    let recipient = app.controller().recipient().clone();
    let inner = render_card(frame, area, 72, 20, ROSE);
    let [text_area, _, buttons_area] = card_rows(inner);

    let body = Style::default().fg(TEXT).italic();
    let mut lines = vec![
        Line::from(Span::styled(
            copy::impact_title(&recipient.name),
            Style::default().fg(TEXT).bold(),
        ))
        .alignment(Alignment::Center),
        Line::default(),
    ];
    for paragraph in copy::impact_body(&recipient.name) {
        lines.push(Line::from(Span::styled(paragraph, body)).alignment(Alignment::Center));
        lines.push(Line::default());
    }
    lines.push(
        Line::from(Span::styled(copy::IMPACT_CLOSING, Style::default().fg(ROSE).bold()))
            .alignment(Alignment::Center),
    );
    lines.push(Line::default());
    lines.push(
        Line::from(Span::styled(
            copy::impact_footer(recipient.age).to_uppercase(),
            Style::default().fg(MUTED),
        ))
        .alignment(Alignment::Center),
    );
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), text_area);

    render_buttons(app, frame, buttons_area, &[("Back to Start", Action::Reset, Color::DarkGray)]);
}

fn render_ai_wish(app: &mut App, frame: &mut Frame, area: Rect) {
    let controller = app.controller();
    let loading = controller.is_loading_wish();

    let width = area.width.saturating_sub(4).min(72);
    let height = area.height.saturating_sub(2).min(20);
    let inner = render_card(frame, area, width, height, PINK);
    let [title_area, text_area, _, buttons_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner);

    let title = format!("{} Message", capitalize(controller.wish_type().as_str()));
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(title, Style::default().fg(TEXT).bold())))
            .alignment(Alignment::Center),
        title_area,
    );

    let text = if loading {
        Paragraph::new(Line::from(Span::styled(
            format!("Writing your wish{}", app.ellipsis()),
            Style::default().fg(MUTED).italic(),
        )))
        .alignment(Alignment::Center)
    } else {
        let lines: Vec<Line> = controller
            .ai_wish()
            .lines()
            .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(TEXT).italic())))
            .collect();
        Paragraph::new(lines).wrap(Wrap { trim: true })
    };
    frame.render_widget(text, text_area);

    let buttons: &[Button] = if loading {
        &[("Back", Action::Back, PINK)]
    } else {
        &[
            ("Regenerate", Action::Regenerate, PURPLE),
            ("Back", Action::Back, PINK),
        ]
    };
    render_buttons(app, frame, buttons_area, buttons);
}

/// Draw a bordered card centred in `area`; returns the area inside it.
fn render_card(frame: &mut Frame, area: Rect, width: u16, height: u16, accent: Color) -> Rect {
    let card = centered(area, width, height);
    frame.render_widget(Clear, card);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(accent))
        .style(Style::default().bg(CARD))
        .padding(Padding::new(2, 2, 1, 0));
    let inner = block.inner(card);
    frame.render_widget(block, card);
    inner
}

/// Text, spacer, one row of buttons.
fn card_rows(inner: Rect) -> [Rect; 3] {
    Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(inner)
}

/// Lay out a centred row of buttons and record their hit areas.
fn render_buttons(app: &mut App, frame: &mut Frame, area: Rect, buttons: &[Button]) {
    const GAP: u16 = 2;

    let widths: Vec<u16> = buttons
        .iter()
        .map(|(label, _, _)| Line::from(*label).width() as u16 + 2)
        .collect();
    let total = widths.iter().sum::<u16>() + GAP * (buttons.len().saturating_sub(1) as u16);

    let mut x = area.x + area.width.saturating_sub(total) / 2;
    for ((label, action, color), width) in buttons.iter().zip(widths) {
        let rect = Rect::new(x, area.y, width, area.height.min(1)).intersection(area);
        if rect.is_empty() {
            break;
        }
        frame.render_widget(
            Paragraph::new(format!(" {} ", label))
                .style(Style::default().bg(*color).fg(Color::White).bold()),
            rect,
        );
        app.control_areas.push((rect, *action));
        x = x.saturating_add(width + GAP);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Confetti drawn into the cells under it.
struct ConfettiLayer<'a> {
    confetti: &'a Confetti,
}

impl Widget for ConfettiLayer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for p in self.confetti.particles() {
            if p.x < 0.0 || p.y < 0.0 {
                continue;
            }
            let col = (p.x / CELL_WIDTH) as u16;
            let row = (p.y / CELL_HEIGHT) as u16;
            if col >= area.width || row >= area.height {
                continue;
            }
            let (r, g, b) = p.color;
            if let Some(cell) = buf.cell_mut(Position::new(area.x + col, area.y + row)) {
                cell.set_char(particle_glyph(p.size, p.angle))
                    .set_fg(Color::Rgb(r, g, b));
            }
        }
    }
}

/// Bigger squares get a full block; every other 45° turn shows as a diamond.
fn particle_glyph(size: f64, angle: f64) -> char {
    let turned = (angle / 45.0) as i64 % 2 == 1;
    match (size >= 8.0, turned) {
        (true, false) => '■',
        (true, true) => '◆',
        (false, false) => '▪',
        (false, true) => '♦',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use surprise_core::{AiGateway, Config};

    fn app() -> App {
        let mut app = App::with_gateway(&Config::new(), AiGateway::offline());
        app.resize(100, 30);
        app
    }

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn press_real(app: &mut App) {
        let real = app.controller().decoys().real_index().unwrap();
        app.dispatch(Action::PressDecoy(real));
    }

    #[test]
    fn test_decoy_rect_stays_inside_area() {
        let area = Rect::new(0, 1, 80, 22);
        for (x, y) in [(10.0, 10.0), (90.0, 90.0), (50.0, 50.0)] {
            let rect = decoy_rect(area, x, y, 17);
            assert!(rect.x >= area.x && rect.right() <= area.right());
            assert!(rect.y >= area.y && rect.bottom() <= area.bottom());
            assert_eq!(rect.height, 1);
        }
        let tiny = decoy_rect(Rect::new(0, 0, 5, 1), 90.0, 90.0, 17);
        assert_eq!(tiny.width, 5);
    }

    #[test]
    fn test_particle_glyphs() {
        assert_eq!(particle_glyph(10.0, 10.0), '■');
        assert_eq!(particle_glyph(10.0, 50.0), '◆');
        assert_eq!(particle_glyph(5.0, 100.0), '▪');
        assert_eq!(particle_glyph(5.0, 140.0), '♦');
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("funny"), "Funny");
        assert_eq!(capitalize(""), "");
    }

    #[tokio::test]
    async fn test_welcome_records_every_decoy() {
        let mut app = app();
        let screen = draw(&mut app);
        assert!(screen.contains("A surprise for Muskaan"));
        assert_eq!(app.decoy_areas.len(), 15);
        assert!(app.control_areas.is_empty());
    }

    #[tokio::test]
    async fn test_clicking_a_rendered_control_advances() {
        let mut app = app();
        press_real(&mut app);
        let screen = draw(&mut app);
        assert!(screen.contains("Okay, next fact!"));
        assert!(app.decoy_areas.is_empty());

        let (rect, action) = app.control_areas[0];
        assert_eq!(action, Action::Next);
        let clicked = app.action_at(rect.x + 1, rect.y);
        app.dispatch(clicked);
        assert_eq!(app.stage(), Stage::Fact);

        let screen = draw(&mut app);
        assert!(screen.contains("Show me more"));
    }

    #[tokio::test]
    async fn test_celebration_shows_tone_buttons() {
        let mut app = app();
        press_real(&mut app);
        app.dispatch(Action::Next);
        app.dispatch(Action::ShowMore);
        app.dispatch(Action::Continue);
        app.dispatch(Action::LetsParty);

        let screen = draw(&mut app);
        assert!(screen.contains("Happy Birthday, Muskaan!"));
        let actions: Vec<Action> = app.control_areas.iter().map(|(_, a)| *a).collect();
        assert_eq!(
            actions,
            vec![
                Action::ChooseTone(WishTone::Heartfelt),
                Action::ChooseTone(WishTone::Funny),
                Action::ChooseTone(WishTone::Roast),
                Action::OneMoreThing,
            ]
        );
    }

    #[tokio::test]
    async fn test_ai_wish_hides_regenerate_while_loading() {
        let mut app = app();
        press_real(&mut app);
        app.dispatch(Action::Next);
        app.dispatch(Action::ShowMore);
        app.dispatch(Action::Continue);
        app.dispatch(Action::LetsParty);
        app.dispatch(Action::ChooseTone(WishTone::Roast));

        let screen = draw(&mut app);
        assert!(screen.contains("Roast Message"));
        assert!(screen.contains("Writing your wish"));
        assert!(!screen.contains("Regenerate"));
    }
}
