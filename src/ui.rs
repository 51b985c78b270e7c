#![allow(
    // Board coordinates are small and checked before casting
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

use blockfall::app::RenderView;
use blockfall::components::{PieceKind, Shape};
use ratatui::{
    layout::Flex,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

const CELL: &str = "██";
const GHOST: &str = "░░";
const EMPTY: &str = " .";

#[derive(Clone, Copy)]
enum Cell {
    Empty,
    Ghost(PieceKind),
    Filled(PieceKind),
}

pub fn render(f: &mut Frame, view: &RenderView) {
    let board_width = view.board.width as u16 * 2 + 2;
    let board_height = view.board.height as u16 + 2;
    let info_width = 22u16;

    let area = f.area();
    if area.width < board_width + info_width || area.height < board_height {
        let warning = Paragraph::new("Terminal too small!\nPlease resize your terminal.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("blockfall"));
        f.render_widget(warning, area);
        return;
    }

    let [board_area, info_area] = Layout::horizontal([
        Constraint::Length(board_width),
        Constraint::Length(info_width),
    ])
    .flex(Flex::Center)
    .areas(Rect {
        height: board_height,
        ..area
    });

    render_board(f, board_area, view);
    render_info(f, info_area, view);

    if view.paused || view.game_over {
        let text = if view.game_over { "GAME OVER" } else { "PAUSED" };
        let popup = Rect {
            x: board_area.x + board_area.width.saturating_sub(14) / 2,
            y: board_area.y + board_area.height / 2 - 1,
            width: 14.min(board_area.width),
            height: 3,
        };
        f.render_widget(Clear, popup);
        f.render_widget(
            Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL)),
            popup,
        );
    }
}

fn board_cells(view: &RenderView) -> Vec<Vec<Cell>> {
    let mut cells: Vec<Vec<Cell>> = view
        .board
        .cells
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.map_or(Cell::Empty, Cell::Filled))
                .collect()
        })
        .collect();

    let mut paint = |x: i32, y: i32, cell: Cell| {
        if x >= 0 && y >= 0 {
            if let Some(slot) = cells.get_mut(y as usize).and_then(|row| row.get_mut(x as usize)) {
                *slot = cell;
            }
        }
    };

    if let Some(active) = &view.active {
        if let Some(ghost_row) = view.ghost_row {
            for (dx, dy, kind) in active.shape.cells() {
                paint(active.position.x + dx, ghost_row + dy, Cell::Ghost(kind));
            }
        }
        for (dx, dy, kind) in active.shape.cells() {
            paint(active.position.x + dx, active.position.y + dy, Cell::Filled(kind));
        }
    }

    cells
}

fn render_board(f: &mut Frame, area: Rect, view: &RenderView) {
    let lines: Vec<Line> = board_cells(view)
        .into_iter()
        .map(|row| {
            Line::from(
                row.into_iter()
                    .map(|cell| match cell {
                        Cell::Empty => Span::styled(EMPTY, Style::default().fg(Color::DarkGray)),
                        Cell::Ghost(kind) => Span::styled(GHOST, Style::default().fg(kind.get_color())),
                        Cell::Filled(kind) => Span::styled(CELL, Style::default().fg(kind.get_color())),
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let board = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("blockfall"),
    );
    f.render_widget(board, area);
}

fn shape_lines(kind: PieceKind) -> Vec<Line<'static>> {
    let shape = Shape::new(kind);
    (0..shape.size())
        .filter(|&y| (0..shape.size()).any(|x| shape.get(x, y).is_some()))
        .map(|y| {
            Line::from(
                (0..shape.size())
                    .map(|x| match shape.get(x, y) {
                        Some(kind) => Span::styled(CELL, Style::default().fg(kind.get_color())),
                        None => Span::raw("  "),
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}

fn render_info(f: &mut Frame, area: Rect, view: &RenderView) {
    let mut lines = vec![
        Line::from(format!("Score: {}", view.score)),
        Line::from(format!("Lines: {}", view.lines_cleared)),
        Line::from(format!("Level: {}", view.level)),
        Line::from(format!("Best:  {}", view.highscore)),
        Line::from(""),
        Line::from("Hold:"),
    ];

    match view.hold {
        Some(kind) => lines.extend(shape_lines(kind)),
        None => lines.push(Line::from("  -")),
    }

    lines.push(Line::from(""));
    lines.push(Line::from("Next:"));
    for kind in &view.next {
        lines.extend(shape_lines(*kind));
    }

    let info = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Info"));
    f.render_widget(info, area);
}
