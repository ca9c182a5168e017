pub mod exams;
pub mod files;
pub mod scores;
pub mod students;

use std::io::IsTerminal;

use clap::Args;

use gradebook_core::listing::{SortDirection, DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};

/// Pagination and sort-direction flags shared by the list commands.
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Page to show (1-based, clamped into range)
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Rows per page: 10, 20, 50 or 100
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = parse_page_size)]
    pub page_size: usize,
    /// Sort descending instead of ascending
    #[arg(long)]
    pub desc: bool,
}

impl ListArgs {
    pub fn direction(&self) -> SortDirection {
        if self.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

fn parse_page_size(raw: &str) -> Result<usize, String> {
    let size: usize = raw
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if PAGE_SIZE_OPTIONS.contains(&size) {
        Ok(size)
    } else {
        Err(format!("page size must be one of {:?}", PAGE_SIZE_OPTIONS))
    }
}

/// Color badges only when writing to a terminal.
pub fn use_color() -> bool {
    std::io::stdout().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_options() {
        assert_eq!(parse_page_size("50"), Ok(50));
        assert!(parse_page_size("30").is_err());
        assert!(parse_page_size("ten").is_err());
    }
}
