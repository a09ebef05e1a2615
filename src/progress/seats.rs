use crate::error::{Error, Result};
use crate::models::{Outcome, SeatPosition, VoteRecord};
use std::f64::consts::PI;

pub const DEFAULT_TOTAL_SEATS: usize = 100;

// Row radii from the outer row to the inner one, in a 400x200 view box
const ROW_RADII: [f64; 5] = [170.0, 145.0, 120.0, 95.0, 70.0];
const CENTER_X: f64 = 200.0;
const CENTER_Y: f64 = 185.0;

/// Name given to the padding seats nobody from the party occupies.
pub const UNFILLED_SEAT_NAME: &str = "Other parties";

/// Places every vote, plus padding up to `total_seats`, on a hemicycle.
///
/// Seats are filled column by column (angle first), each column from the
/// outer row inwards, so consecutive records end up next to each other.
/// The returned positions follow the input order, padding last.
pub fn layout_seats(votes: &[VoteRecord], total_seats: usize) -> Result<Vec<SeatPosition>> {
    if total_seats == 0 {
        return Err(Error::SeatConfig("total seats must be positive".to_string()));
    }
    if votes.len() > total_seats {
        return Err(Error::SeatConfig(format!(
            "{} votes do not fit in {} seats",
            votes.len(),
            total_seats
        )));
    }

    let num_rows = ROW_RADII.len();
    let num_columns = total_seats.div_ceil(num_rows);

    let mut records = votes.iter().cloned().chain((votes.len()..total_seats).map(unfilled_seat));
    let mut positions = Vec::with_capacity(total_seats);

    for col in 0..num_columns {
        let angle = column_angle(col, num_columns);

        for radius in ROW_RADII {
            let Some(record) = records.next() else {
                return Ok(positions);
            };

            positions.push(SeatPosition {
                record,
                x: CENTER_X + radius * angle.cos(),
                y: CENTER_Y - radius * angle.sin(),
                radius,
                size: marker_size(radius),
            });
        }
    }

    Ok(positions)
}

/// Angle of a column: the first column sits at PI (far left), the last at 0.
pub fn column_angle(col: usize, num_columns: usize) -> f64 {
    let span = num_columns.saturating_sub(1).max(1) as f64;
    PI - (col as f64 / span) * PI
}

fn marker_size(radius: f64) -> f64 {
    if radius > 130.0 {
        12.0
    } else if radius > 100.0 {
        11.0
    } else {
        10.0
    }
}

fn unfilled_seat(index: usize) -> VoteRecord {
    VoteRecord {
        voter_id: format!("other-{}", index),
        voter_name: UNFILLED_SEAT_NAME.to_string(),
        outcome: Outcome::Other,
    }
}

/// Stable reorder so that equal outcomes sit in neighbouring seats.
pub fn cluster_by_outcome(votes: &[VoteRecord]) -> Vec<VoteRecord> {
    let mut clustered = votes.to_vec();
    clustered.sort_by_key(|vote| vote.outcome);
    clustered
}
