//! Roster and prompt wiring for the demo subcommands.

use crate::agents::{Participant, Roster};

/// Human player's display name in the Gomoku demo.
pub const GOMOKU_HUMAN: &str = "Tang";

/// NPC player's display name in the Gomoku demo.
pub const GOMOKU_NPC: &str = "Ming";

/// Suggested opening inputs, printed at console startup.
pub const GOMOKU_SUGGESTIONS: &[&str] = &[
    "Let's start! I go first: <1,1>",
    "You go first, Ming",
    "New game, my move first",
];

/// System instruction for the painting assistant.
pub const PAINTER_SYSTEM_PROMPT: &str = "You are a helpful assistant.\n\
After receiving the user's request, you should:\n\
- first draw an image and obtain the image url,\n\
- then describe how the image could be downloaded and processed,\n\
- and finally present the image url to the user.";

/// Roster for the 5x5 Gomoku group chat: a board-updating agent, an NPC
/// white-stone player, and the human black-stone player.
pub fn gomoku_roster() -> Roster {
    let background = format!(
        "A Gomoku group chat with a 5x5 board. The black-stone player and the \
         white-stone player alternate moves; after each move the board is \
         updated and shown. {GOMOKU_NPC} plays white, {GOMOKU_HUMAN} plays black."
    );

    Roster::new(
        background,
        vec![
            Participant::agent(
                "Board",
                "You act as a Gomoku board. Given the previous board and the \
                 coordinate a player just placed a stone on, show the new board \
                 as a matrix. Use 0 for an empty cell, 1 for a black stone and \
                 -1 for a white stone. Positions are written <i,j> where i is \
                 the row and j is the column; the top-left cell is <0,0>.",
            )
            .with_description("keeps the board up to date"),
            Participant::agent(
                GOMOKU_NPC,
                "You are a skilled Gomoku player and you play white. On the \
                 board 0 is an empty cell, 1 a black stone and -1 a white \
                 stone. Positions are written <i,j> where i is the row and j \
                 is the column; the top-left cell is <0,0>. Decide where to \
                 place your stone and reply with the coordinate only:\n<i,j>\n\
                 Return nothing besides that coordinate.",
            )
            .with_description("white-stone player"),
            Participant::human(GOMOKU_HUMAN).with_description("black-stone player"),
        ],
    )
}
