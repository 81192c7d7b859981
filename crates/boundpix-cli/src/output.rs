use boundpix_common::{MediaFormat, PixelSize};
use boundpix_formats::ContainerProperties;
use console::style;
use std::path::Path;

/// Output formatter with colored messages
pub struct OutputFormatter {
    colored: bool,
}

impl OutputFormatter {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    /// Print success message
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("{} {}", style("✓").green().bold(), message);
        } else {
            println!("[SUCCESS] {}", message);
        }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("{} {}", style("✗").red().bold(), message);
        } else {
            eprintln!("[ERROR] {}", message);
        }
    }

    /// Print warning message
    pub fn warn(&self, message: &str) {
        if self.colored {
            println!("{} {}", style("⚠").yellow().bold(), message);
        } else {
            println!("[WARN] {}", message);
        }
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("{} {}", style("ℹ").cyan(), message);
        } else {
            println!("[INFO] {}", message);
        }
    }

    /// Format file path
    pub fn format_path(&self, path: &Path) -> String {
        if self.colored {
            style(path.display()).cyan().to_string()
        } else {
            path.display().to_string()
        }
    }

    /// Format a pixel size, dropping fractions the calculator may leave
    pub fn format_dimensions(&self, size: PixelSize) -> String {
        let dims = if size.width.fract() == 0.0 && size.height.fract() == 0.0 {
            size.to_string()
        } else {
            format!("{:.2}x{:.2}", size.width, size.height)
        };

        if self.colored {
            style(dims).yellow().to_string()
        } else {
            dims
        }
    }

    /// Format file size
    pub fn format_size(&self, kb: usize, mb: f64) -> String {
        let size_str = if kb < 1024 {
            format!("{} KB", kb)
        } else {
            format!("{:.4} MB", mb)
        };

        if self.colored {
            style(size_str).yellow().to_string()
        } else {
            size_str
        }
    }

    /// Format media format
    pub fn format_format(&self, format: MediaFormat) -> String {
        if self.colored {
            style(format.to_string()).magenta().to_string()
        } else {
            format.to_string()
        }
    }

    /// Print size calculation result
    pub fn print_size(&self, original: PixelSize, constrained: PixelSize, target: PixelSize) {
        println!("Original:    {}", self.format_dimensions(original));
        println!("Constrained: {}", self.format_dimensions(constrained));
        println!(
            "Target:      {} ({} px)",
            self.format_dimensions(target),
            target.area()
        );
    }

    /// Print bounded decode result
    pub fn print_decode(
        &self,
        input: &Path,
        output: &Path,
        original: PixelSize,
        dimensions: (u32, u32),
    ) {
        self.success(&format!(
            "Decoded {} ({}) → {} ({})",
            self.format_path(input),
            self.format_dimensions(original),
            self.format_path(output),
            self.format_dimensions(PixelSize::from(dimensions))
        ));
    }

    /// Print container properties, one per line
    pub fn print_properties(&self, input: &Path, properties: &ContainerProperties) {
        if properties.is_empty() {
            self.warn(&format!(
                "{} is not a recognized image container",
                self.format_path(input)
            ));
            return;
        }

        println!("{}", self.format_path(input));
        let width = properties.keys().map(String::len).max().unwrap_or(0);
        for (key, value) in properties {
            if self.colored {
                let key = format!("{:width$}", key, width = width);
                println!("  {}  {}", style(key).bold(), value);
            } else {
                println!("  {:width$}  {}", key, value, width = width);
            }
        }
    }

    /// Print batch summary
    pub fn print_batch_summary(&self, total: usize, success: usize, failed: usize) {
        println!();
        if self.colored {
            println!(
                "{} Total: {}, {} Success: {}, {} Failed: {}",
                style("Summary:").bold(),
                total,
                style("✓").green(),
                success,
                style("✗").red(),
                failed
            );
        } else {
            println!(
                "Summary: Total: {}, Success: {}, Failed: {}",
                total, success, failed
            );
        }
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}
