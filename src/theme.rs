use ratatui::style::{Color, Modifier, Style};

pub(crate) const BACKGROUND: Color = Color::Black;

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(BACKGROUND);

pub(crate) const SEASON_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const MONTH_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

/// Color of the lines traced around each month
pub(crate) const OUTLINE_COLOR: Color = Color::Black;

pub(crate) const FOCUS_STYLE: Style = Style::new().fg(Color::Red).add_modifier(Modifier::BOLD);

pub(crate) const FOCUS_SYMBOL: &str = "●";

pub(crate) const TOOLTIP_STYLE: Style = BASE_STYLE.fg(Color::LightYellow);

pub(crate) const PERIOD_STYLE: Style = BASE_STYLE.fg(Color::Gray);

pub(crate) const STATUS_STYLE: Style = BASE_STYLE.add_modifier(Modifier::REVERSED);
