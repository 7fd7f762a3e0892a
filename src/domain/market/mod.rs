// Price and feature tables
pub mod price_bar;

// Provider payload shapes
pub mod raw_bars;

pub use price_bar::{FeatureRow, PriceBar, TrainingSample};
pub use raw_bars::{RawBar, RawBars, RawRow, WideColumn};

/// Split a combined multi-ticker table into per-ticker groups.
///
/// Groups come out in first-seen ticker order and keep the input order of
/// their rows; callers sort by date when they need to.
pub fn group_by_ticker<'a, T, F>(items: &'a [T], ticker_of: F) -> Vec<(String, Vec<&'a T>)>
where
    F: Fn(&T) -> &str,
{
    let mut groups: Vec<(String, Vec<&'a T>)> = Vec::new();
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for item in items {
        let ticker = ticker_of(item);
        match index.get(ticker) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(ticker.to_string(), groups.len());
                groups.push((ticker.to_string(), vec![item]));
            }
        }
    }

    groups
}
