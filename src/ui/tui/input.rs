use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::session::SortField;
use crate::ui::{AppMode, DrawSurface, UiAction};

/// Translate a terminal event into an action for the current screen
pub fn map_event<S>(event: &Event, mode: AppMode, surface: &S) -> UiAction
where
    S: DrawSurface + ?Sized,
{
    match event {
        Event::Key(key) => handle_key_event(*key, mode),
        Event::Mouse(mouse) => handle_mouse_event(*mouse, mode, surface),
        _ => UiAction::None,
    }
}

/// Handle keyboard events for both screens
pub fn handle_key_event(key_event: KeyEvent, mode: AppMode) -> UiAction {
    if key_event.kind == KeyEventKind::Release {
        return UiAction::None;
    }

    // Raw mode swallows SIGINT
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key_event.code, KeyCode::Char('c'))
    {
        return UiAction::Quit;
    }

    match mode {
        AppMode::Board => handle_board_keys(key_event),
        AppMode::Chart => handle_chart_keys(key_event),
    }
}

fn handle_board_keys(key_event: KeyEvent) -> UiAction {
    match key_event.code {
        KeyCode::Up => UiAction::MoveSelection(-1),
        KeyCode::Down => UiAction::MoveSelection(1),
        KeyCode::Enter => UiAction::OpenSelected,
        KeyCode::F(5) => UiAction::CycleSort(SortField::Price),
        KeyCode::F(6) => UiAction::CycleSort(SortField::Change),
        KeyCode::Char('q') | KeyCode::Char('Q') => UiAction::Quit,
        _ => UiAction::None,
    }
}

fn handle_chart_keys(key_event: KeyEvent) -> UiAction {
    match key_event.code {
        KeyCode::Up => UiAction::ChangePeriod(-1),
        KeyCode::Down => UiAction::ChangePeriod(1),
        KeyCode::Left => UiAction::MoveCursor(-1),
        KeyCode::Right => UiAction::MoveCursor(1),
        KeyCode::Char('f') | KeyCode::Char('F') => UiAction::ToggleFollow,
        KeyCode::Char('r') | KeyCode::Char('R') => UiAction::ForceRefresh,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => UiAction::CloseChart,
        _ => UiAction::None,
    }
}

fn handle_mouse_event<S>(mouse: MouseEvent, mode: AppMode, surface: &S) -> UiAction
where
    S: DrawSurface + ?Sized,
{
    match (mode, mouse.kind) {
        (AppMode::Board, MouseEventKind::ScrollUp) => UiAction::MoveSelection(-1),
        (AppMode::Board, MouseEventKind::ScrollDown) => UiAction::MoveSelection(1),
        (AppMode::Board, MouseEventKind::Down(MouseButton::Left)) => surface
            .hit_test_row(mouse.row)
            .map_or(UiAction::None, UiAction::OpenRow),
        (AppMode::Chart, MouseEventKind::ScrollUp) => UiAction::ChangePeriod(-1),
        (AppMode::Chart, MouseEventKind::ScrollDown) => UiAction::ChangePeriod(1),
        (AppMode::Chart, MouseEventKind::Down(MouseButton::Right)) => UiAction::CloseChart,
        (AppMode::Chart, MouseEventKind::Down(MouseButton::Left)) => surface
            .hit_test_candle(mouse.column)
            .map_or(UiAction::None, UiAction::SelectCandle),
        _ => UiAction::None,
    }
}
