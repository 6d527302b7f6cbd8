use std::fs::exists;
use std::time::Instant;

use tengen::dataset::DatasetWriter;
use tengen::engine::policy_net::constants::{NUM_CONV_LAYERS, NUM_FILTERS};
use tengen::engine::policy_net::conv_net::PolicyNet;
use tengen::engine::policy_net::features::DEVICE;
use tengen::engine::policy_net::PolicyEvaluator;
use tengen::engine::selfplay::play_game;
use tengen::utils::display::{planes_to_goban, print_goban};

pub const MODEL_FILE: &str = "model.safetensors";
pub const OUTPUT_FILE: &str = "data/selfplay.traindata";
pub const NUM_GAMES: usize = 10;
pub const PLIES_PER_GAME: usize = 180;
pub const AVERAGE_SYMMETRIES: bool = true;
pub const SHOW_FINAL_BOARDS: bool = true;

fn main() {
    let mut model = PolicyNet::new(*DEVICE, NUM_CONV_LAYERS, NUM_FILTERS);
    if exists(MODEL_FILE).expect("Failed to check if model file exists") {
        println!("Loading model from file...");
        model.load(MODEL_FILE).expect("Failed to load model");
    }
    let evaluator = PolicyEvaluator::new(model, AVERAGE_SYMMETRIES);

    if let Some(parent) = std::path::Path::new(OUTPUT_FILE).parent() {
        std::fs::create_dir_all(parent).expect("Failed to create output directory");
    }
    let mut writer = DatasetWriter::create(OUTPUT_FILE).expect("Failed to create dataset file");

    let start_time = Instant::now();
    let mut records_written = 0usize;

    for game_idx in 0..NUM_GAMES {
        let records = play_game(&evaluator, PLIES_PER_GAME).expect("Self-play game failed");

        if SHOW_FINAL_BOARDS {
            if let Some(last) = records.last() {
                println!(
                    "Game {}/{}, last move {}:",
                    game_idx + 1,
                    NUM_GAMES,
                    last.vertex
                );
                print_goban(&planes_to_goban(&last.planes, 0));
            }
        }

        for record in &records {
            writer
                .write(&record.to_train_record())
                .expect("Failed to write record");
            records_written += 1;
        }

        println!(
            "Completed {}/{} games. Time elapsed: {:.2}s",
            game_idx + 1,
            NUM_GAMES,
            start_time.elapsed().as_secs_f32()
        );
    }

    writer.flush().expect("Failed to flush dataset file");
    println!("Wrote {} records to {}", records_written, OUTPUT_FILE);
}
