use crate::calendar::{
    Calendar, DateRange, DayValues, DrawMode, GridExtent, GridLayout, Heatmap, Period, ViewState,
};
use crate::help::Help;
use crate::theme::{BASE_STYLE, STATUS_STYLE};
use crossterm::event::{
    read, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};
use time::{format_description::FormatItem, macros::format_description, Date, Duration};

static STATUS_FMT: &[FormatItem<'_>] =
    format_description!("[weekday repr:short] [year]-[month]-[day]");

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct App {
    values: DayValues,
    periods: Vec<Period>,
    extent: GridExtent,
    layout: GridLayout,
    selection: Option<DateRange>,
    mode: DrawMode,
    today: Date,
    focus: Option<Date>,
    hover: Option<Date>,
    view: ViewState,
    state: AppState,
}

impl App {
    pub(crate) fn new(values: DayValues, extent: GridExtent, today: Date) -> App {
        App {
            values,
            periods: Vec::new(),
            extent,
            layout: GridLayout::default(),
            selection: None,
            mode: DrawMode::Focus,
            today,
            focus: None,
            hover: None,
            view: ViewState::new(),
            state: AppState::Calendar,
        }
    }

    pub(crate) fn periods(mut self, periods: Vec<Period>) -> App {
        self.periods = periods;
        self
    }

    pub(crate) fn selection(mut self, selection: Option<DateRange>) -> App {
        self.selection = selection;
        self
    }

    /// Focuses on `date` and scrolls to it, if it is within the extent
    pub(crate) fn start_date(mut self, date: Date) -> App {
        self.focus_on(date);
        self
    }

    pub(crate) fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        while !self.quitting() {
            self.draw(terminal)?;
            self.handle_input()?;
        }
        Ok(())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        let event = read()?;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = event.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        } else if let Event::Mouse(mouse) = event {
            self.handle_mouse(mouse);
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match self.state {
            AppState::Calendar => match key {
                KeyCode::Up => self.move_focus(Duration::days(-1)),
                KeyCode::Down => self.move_focus(Duration::days(1)),
                KeyCode::Left => self.move_focus(Duration::weeks(-1)),
                KeyCode::Right => self.move_focus(Duration::weeks(1)),
                KeyCode::Char('j') => self.scroll_down(1),
                KeyCode::Char('k') => self.scroll_up(1),
                KeyCode::Char('z') | KeyCode::PageDown => self.scroll_down(self.view.page_size()),
                KeyCode::Char('w') | KeyCode::PageUp => self.scroll_up(self.view.page_size()),
                KeyCode::Char('0') | KeyCode::Home => self.focus_on(self.today),
                KeyCode::Char('c') => {
                    self.mode = match self.mode {
                        DrawMode::Focus => DrawMode::Context,
                        DrawMode::Context => DrawMode::Focus,
                    };
                    true
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Quitting => false,
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent) {
        if self.state != AppState::Calendar {
            return;
        }
        let date = self
            .view
            .date_at(event.column, event.row, &self.extent, &self.layout);
        match event.kind {
            MouseEventKind::Moved => self.hover = date,
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(date) = date {
                    self.focus_on(date);
                }
            }
            MouseEventKind::ScrollDown => {
                self.scroll_down(1);
            }
            MouseEventKind::ScrollUp => {
                self.scroll_up(1);
            }
            _ => (),
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn scroll_down(&mut self, seasons: u16) -> bool {
        self.view
            .scroll_forwards(seasons, self.extent.season_qty())
            .is_ok()
    }

    fn scroll_up(&mut self, seasons: u16) -> bool {
        self.view.scroll_backwards(seasons).is_ok()
    }

    // Returns `false` if the focus would leave the extent
    fn move_focus(&mut self, delta: Duration) -> bool {
        let base = self
            .focus
            .unwrap_or_else(|| self.today.clamp(self.extent.lo(), self.extent.hi()));
        match base.checked_add(delta) {
            Some(date) => self.focus_on(date),
            None => false,
        }
    }

    fn focus_on(&mut self, date: Date) -> bool {
        let Some((index, _)) = self.extent.locate(date).filter(|_| self.extent.contains(date))
        else {
            return false;
        };
        self.focus = Some(date);
        self.view.reveal(index);
        tracing::debug!(%date, season_index = index, scroll = self.view.scroll(), "Moved focus");
        true
    }

    fn status(&self) -> String {
        let (verb, date) = match (self.hover, self.focus) {
            (Some(date), _) => ("Pointing at", date),
            (None, Some(date)) => ("Focused on", date),
            (None, None) => return String::from(" Press ? for help"),
        };
        let shown = date.format(&STATUS_FMT).unwrap_or_else(|_| date.to_string());
        match self.values.get(date) {
            Some(v) => format!(" {verb} {shown}: {v}"),
            None => format!(" {verb} {shown}: no data"),
        }
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let [cal_area, status_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
        let heatmap = Heatmap::new(&self.values, self.extent)
            .periods(&self.periods)
            .mode(self.mode)
            .focus(self.focus)
            .selection(self.selection);
        Calendar::new(heatmap)
            .hover(self.hover.or(self.focus))
            .render(cal_area, buf, &mut self.view);
        Line::styled(self.status(), STATUS_STYLE).render(status_area, buf);
        if self.state == AppState::Helping {
            Help(BASE_STYLE).render(area, buf);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Quitting,
}
