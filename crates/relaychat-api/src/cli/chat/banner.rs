//! Welcome banner shown when the interactive chat starts.

use std::io::{self, Write};

use console::style;

/// What the banner describes.
pub struct BannerInfo<'a> {
    pub endpoint: &'a str,
    /// First model in the fallback order.
    pub model: &'a str,
    pub chat_title: Option<&'a str>,
    pub ephemeral: bool,
}

pub fn print_welcome_banner<W: Write>(out: &mut W, info: &BannerInfo<'_>) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {} {}", style("⚡").bold(), style("relaychat").cyan().bold())?;
    writeln!(out)?;
    writeln!(out, "  {}  {}", style("Endpoint:").bold(), style(info.endpoint).dim())?;
    writeln!(out, "  {}     {}", style("Model:").bold(), style(info.model).dim())?;
    writeln!(
        out,
        "  {}      {}",
        style("Chat:").bold(),
        style(info.chat_title.unwrap_or("(new chat on first message)")).dim()
    )?;
    if info.ephemeral {
        writeln!(
            out,
            "  {}",
            style("Ephemeral mode: nothing will be saved").yellow()
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    )?;
    writeln!(out, "  {}", style("---").dim())?;
    writeln!(out)?;
    Ok(())
}
