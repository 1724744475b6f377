use std::collections::HashMap;

/// The merged move choice and its supporting statistics, ready to report to
/// the GTP client or log as the Coordinator's chosen reply.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateResult {
    pub coord: String,
    /// The winning move's own data-line playout total.
    pub playouts: u64,
    pub value_from_black: f32,
    /// Sum of every reply header's `total_playouts` field.
    pub total_playouts: u64,
    /// Sum of every reply header's `threads` field.
    pub threads: u64,
}

#[derive(Default)]
struct Accumulator {
    playouts: u64,
    weighted_value: f64,
    first_seen_step: usize,
}

/// Merges per-slave move statistics lines into one playout-weighted verdict.
///
/// Each slave reply is expected to contain zero or more data lines of the
/// form `<coord> <playouts> <value>`, one per candidate move that slave
/// considered, in any order, possibly interleaved with other reply text
/// which is ignored. `value` is always reported from Black's perspective so
/// slaves need not know whose turn it is.
pub struct Aggregator;

impl Aggregator {
    /// Parses every reply's data lines and returns the move with the
    /// greatest total playout count across all slaves, weighting each
    /// slave's reported value by its playout share. Ties (equal total
    /// playouts) resolve toward whichever coordinate was first seen to
    /// reach the maximum, scanning replies in the order given.
    ///
    /// Returns `None` if no reply contained a single parseable data line.
    pub fn aggregate(replies: &[String]) -> Option<AggregateResult> {
        let mut totals: HashMap<String, Accumulator> = HashMap::new();
        let mut step = 0usize;
        let mut total_playouts = 0u64;
        let mut total_threads = 0u64;

        for reply in replies {
            let mut lines = reply.lines();
            let first_line = lines.next();
            let header = first_line.and_then(parse_header_line);
            if let Some((playouts, threads)) = header {
                total_playouts += playouts;
                total_threads += threads;
            }
            // Only the header line is excluded from data-line scanning; if
            // the first line isn't a header, it's a data line like any other.
            let data_lines = first_line
                .filter(|_| header.is_none())
                .into_iter()
                .chain(lines);
            for line in data_lines {
                if let Some((coord, playouts, value)) = parse_data_line(line) {
                    let entry = totals.entry(coord).or_default();
                    if entry.playouts == 0 && entry.weighted_value == 0.0 {
                        entry.first_seen_step = step;
                    }
                    entry.playouts += playouts;
                    entry.weighted_value += playouts as f64 * value as f64;
                    step += 1;
                }
            }
        }

        let mut best: Option<(&String, &Accumulator)> = None;
        for (coord, acc) in totals.iter() {
            best = Some(match best {
                None => (coord, acc),
                Some((best_coord, best_acc)) => {
                    if acc.playouts > best_acc.playouts
                        || (acc.playouts == best_acc.playouts
                            && acc.first_seen_step < best_acc.first_seen_step)
                    {
                        (coord, acc)
                    } else {
                        (best_coord, best_acc)
                    }
                }
            });
        }

        best.map(|(coord, acc)| {
            let value_from_black = if acc.playouts > 0 {
                (acc.weighted_value / acc.playouts as f64) as f32
            } else {
                0.0
            };
            AggregateResult {
                coord: coord.clone(),
                playouts: acc.playouts,
                value_from_black,
                total_playouts,
                threads: total_threads,
            }
        })
    }
}

/// Parses a reply's header line, `=<id> <total_playouts> <threads>[ <reserved>]`.
/// `?<id> ...` (a negative ack) and anything else carries no statistics.
fn parse_header_line(line: &str) -> Option<(u64, u64)> {
    let mut fields = line.split_whitespace();
    let sigil = fields.next()?;
    if !sigil.starts_with('=') {
        return None;
    }
    let playouts: u64 = fields.next()?.parse().ok()?;
    let threads: u64 = fields.next()?.parse().ok()?;
    Some((playouts, threads))
}

/// Parses one `<coord> <playouts> <value>` data line; tolerant of extra
/// whitespace, intolerant of anything else so free-text reply lines are
/// silently skipped rather than misparsed. A reply's own header line is
/// never passed here — `aggregate` peels it off first — but the `=`/`?`
/// guard stays as a defense against a malformed reply repeating its header.
fn parse_data_line(line: &str) -> Option<(String, u64, f32)> {
    let mut fields = line.split_whitespace();
    let coord = fields.next()?;
    if coord.starts_with('=') || coord.starts_with('?') {
        return None;
    }
    let playouts: u64 = fields.next()?.parse().ok()?;
    let value: f32 = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some((coord.to_string(), playouts, value))
}
