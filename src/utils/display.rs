use tch::Tensor;

use crate::engine::policy_net::constants::{PLANE_OPPONENT_STONES, PLANE_OWN_STONES, PLANE_TO_MOVE_COLOR};
use crate::utils::color::Color;
use crate::utils::vertex::{BOARD_SIZE, COLUMN_LETTERS};

pub type Goban = [[char; BOARD_SIZE]; BOARD_SIZE];

pub const EMPTY_GOBAN: Goban = [['.'; BOARD_SIZE]; BOARD_SIZE];

pub const BLACK_STONE_CHAR: char = 'X';
pub const WHITE_STONE_CHAR: char = 'O';

/// Renders one board of a feature-plane stack as characters. The stack only
/// distinguishes the mover's stones from the opponent's; the to-move-colour
/// plane decides which of the two is Black.
pub fn planes_to_goban(planes: &Tensor, batch_index: i64) -> Goban {
    let to_move = Color::from(
        planes.double_value(&[batch_index, PLANE_TO_MOVE_COLOR as i64, 0, 0]) != 0.,
    );
    let (own_char, opponent_char) = match to_move {
        Color::Black => (BLACK_STONE_CHAR, WHITE_STONE_CHAR),
        Color::White => (WHITE_STONE_CHAR, BLACK_STONE_CHAR),
    };

    let mut goban = EMPTY_GOBAN;
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            let own = planes.double_value(&[
                batch_index,
                PLANE_OWN_STONES as i64,
                row as i64,
                col as i64,
            ]);
            let opponent = planes.double_value(&[
                batch_index,
                PLANE_OPPONENT_STONES as i64,
                row as i64,
                col as i64,
            ]);
            if own != 0. {
                goban[row][col] = own_char;
            } else if opponent != 0. {
                goban[row][col] = opponent_char;
            }
        }
    }
    goban
}

pub fn goban_to_string(goban: &Goban) -> String {
    let mut out = String::new();
    out.push_str("   ");
    for letter in COLUMN_LETTERS {
        out.push(letter);
        out.push(' ');
    }
    out.push('\n');
    for (row, chars) in goban.iter().enumerate() {
        out.push_str(&format!("{:>2} ", BOARD_SIZE - row));
        for c in chars {
            out.push(*c);
            out.push(' ');
        }
        out.push('\n');
    }
    out
}

pub fn print_goban(goban: &Goban) {
    print!("{}", goban_to_string(goban));
}
