use crate::check::{Message, Severity};
use crate::python::InterpreterInfo;
use crate::report::Report;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use std::io::Write;

const RULE_WIDTH: usize = 80;

/// Print the full validation report. Write errors are ignored: output is
/// best effort and never changes the exit status.
pub fn render(out: &mut dyn Write, report: &Report, interpreter: &InterpreterInfo) {
    print_banner(out, interpreter);

    for (index, result) in report.results().iter().enumerate() {
        print_header(out, &format!("{}. {}", index + 1, result.title));
        for message in &result.messages {
            print_message(out, message);
        }
    }

    print_summary(out, report);
}

fn separator(out: &mut dyn Write) {
    writeln!(out, "{}", "=".repeat(RULE_WIDTH)).ok();
}

fn print_header(out: &mut dyn Write, title: &str) {
    writeln!(out).ok();
    writeln!(out, "{}", title.if_supports_color(Stdout, |s| s.bold())).ok();
}

fn print_banner(out: &mut dyn Write, interpreter: &InterpreterInfo) {
    separator(out);
    writeln!(
        out,
        "{}",
        "🔬 GTC NVFP4 TRAINING LAB - COMPREHENSIVE VALIDATION".if_supports_color(Stdout, |s| s.bold())
    )
    .ok();
    let python = match &interpreter.version {
        Some(version) => format!("Python {version} ({})", interpreter.program),
        None => format!("Python interpreter: {}", interpreter.program),
    };
    writeln!(out, "{}", python.if_supports_color(Stdout, |s| s.dimmed())).ok();
    separator(out);
}

fn print_message(out: &mut dyn Write, message: &Message) {
    let text = message.text.as_str();
    match message.severity {
        Severity::Success => writeln!(
            out,
            "  {}",
            format!("✅ {text}").if_supports_color(Stdout, |s| s.green())
        ),
        Severity::Error => writeln!(
            out,
            "  {}",
            format!("❌ {text}").if_supports_color(Stdout, |s| s.red())
        ),
        Severity::Warning => writeln!(
            out,
            "  {}",
            format!("⚠️  {text}").if_supports_color(Stdout, |s| s.yellow())
        ),
        Severity::Info => writeln!(
            out,
            "  {}",
            format!("ℹ️  {text}").if_supports_color(Stdout, |s| s.blue())
        ),
    }
    .ok();
}

fn print_summary(out: &mut dyn Write, report: &Report) {
    writeln!(out).ok();
    separator(out);
    print_header(out, "SUMMARY");

    writeln!(out, "\n  Required components:").ok();
    for result in report.required() {
        let status = if result.passed() {
            format!("{}", "PASS".if_supports_color(Stdout, |s| s.green()))
        } else {
            format!("{}", "FAIL".if_supports_color(Stdout, |s| s.red()))
        };
        writeln!(out, "    • {}: {status}", result.name).ok();
    }

    writeln!(out, "\n  Optional components:").ok();
    for result in report.optional() {
        let status = if result.passed() {
            format!("{}", "PASS".if_supports_color(Stdout, |s| s.green()))
        } else {
            format!("{}", "NOT AVAILABLE".if_supports_color(Stdout, |s| s.yellow()))
        };
        writeln!(out, "    • {}: {status}", result.name).ok();
    }

    separator(out);
    writeln!(out).ok();
    if report.passed() {
        writeln!(
            out,
            "{}",
            "✅ ENVIRONMENT READY FOR NVFP4 TRAINING!"
                .if_supports_color(Stdout, |s| s.green().bold().to_string())
        )
        .ok();
    } else {
        writeln!(
            out,
            "{}",
            "❌ ENVIRONMENT HAS ISSUES - See failures above"
                .if_supports_color(Stdout, |s| s.red().bold().to_string())
        )
        .ok();
    }
    separator(out);
}
