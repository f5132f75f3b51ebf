//! Message templates
//!
//! Wording is presentation, but an owner report always states the new and
//! modified counts, lists each file relative to its watched folder, and ends
//! with a verdict sentence that depends on whether the checker flagged anything.

use std::fmt::Write as _;
use std::path::Path;

/// Subject and body of a message before addressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composed {
    pub subject: String,
    pub body: String,
}

/// Findings for one watched folder after a clean validation pass.
#[derive(Debug, Clone)]
pub struct OwnerReport<'a> {
    /// Leaf name of the watched folder
    pub folder_name: &'a str,
    pub owner_names: Vec<String>,
    /// New files, relative to the folder
    pub new_files: Vec<String>,
    /// Modified files, relative to the folder
    pub modified_files: Vec<String>,
    /// Marker occurrences summed over all reports
    pub invalid_count: usize,
    /// Checker name as owners know it
    pub tool_name: &'a str,
    pub marker: &'a str,
    pub signature: &'a str,
}

impl OwnerReport<'_> {
    pub fn compose(&self) -> Composed {
        let mut body = String::new();
        let _ = writeln!(body, "Dear {},", self.owner_names.join(", "));
        let _ = writeln!(body);
        let _ = writeln!(
            body,
            "I have found {} new and {} modified file(s) in the {} folder, which is owned by you:",
            self.new_files.len(),
            self.modified_files.len(),
            self.folder_name
        );
        let _ = writeln!(body);
        write_file_list(&mut body, "New files:", &self.new_files);
        write_file_list(&mut body, "Modified files:", &self.modified_files);
        let _ = writeln!(
            body,
            "{} has been run on the updated file(s) and the log files are attached with this email. {}",
            self.tool_name,
            self.verdict()
        );
        let _ = writeln!(body);
        let _ = writeln!(body, "Best wishes,");
        let _ = writeln!(body, "{}", self.signature);

        Composed {
            subject: format!("Automated {} report", self.tool_name),
            body,
        }
    }

    /// Verdict sentence for the accumulated marker count.
    pub fn verdict(&self) -> String {
        if self.invalid_count > 0 {
            format!(
                "There were {count} serious errors reported by {tool} for your file(s). \
                 These errors are marked with the word '{marker}' in the attached log files, \
                 and need to be fixed before your results can be used. Please examine the \
                 attached files, identify and correct the errors in your file(s), and update \
                 the version in your shared folder.",
                count = self.invalid_count,
                tool = self.tool_name,
                marker = self.marker,
            )
        } else {
            format!(
                "There were no serious errors reported by {} for your file(s). \
                 Thanks for following the format.",
                self.tool_name
            )
        }
    }
}

fn write_file_list(body: &mut String, heading: &str, files: &[String]) {
    let _ = writeln!(body, "{heading}");
    if files.is_empty() {
        let _ = writeln!(body, "    (none)");
    }
    for file in files {
        let _ = writeln!(body, "    {file}");
    }
    let _ = writeln!(body);
}

/// Administrator alert: the checker could not be launched or did not finish.
pub fn tool_error_alert(tool_name: &str, file: &Path, message: &str) -> Composed {
    Composed {
        subject: format!("Error in {tool_name}"),
        body: format!(
            "Something went wrong running {tool_name} on {}:\n\n{message}\n\n\
             The remaining files in this folder are still being checked.\n",
            file.display()
        ),
    }
}

/// Administrator alert: the checker produced a suspiciously short report.
pub fn malfunction_alert(
    tool_name: &str,
    folder: &Path,
    file: &Path,
    line_count: usize,
    min_lines: usize,
) -> Composed {
    Composed {
        subject: format!("{tool_name} malfunction in {}", folder.display()),
        body: format!(
            "{tool_name} produced a report of only {line_count} line(s) for {} \
             (at least {min_lines} expected), so it most likely failed to process the file.\n\n\
             Validation of {} was stopped, the owners were not notified, and the folder's \
             inventory was left unchanged so the same files are retried on the next run.\n\
             The short report is attached.\n",
            file.display(),
            folder.display()
        ),
    }
}

/// Administrator alert: a watched folder could not be processed this cycle.
pub fn folder_failure_alert(folder: &Path, reason: &str) -> Composed {
    Composed {
        subject: format!("fitswatch could not process {}", folder.display()),
        body: format!(
            "The watched folder {} was skipped this cycle:\n\n{reason}\n\n\
             Its inventory was left unchanged.\n",
            folder.display()
        ),
    }
}

/// Administrator alert: the run itself failed.
pub fn process_failure_alert(reason: &str) -> Composed {
    Composed {
        subject: "fitswatch run failed".to_string(),
        body: format!("The fitswatch run stopped with an error:\n\n{reason}\n"),
    }
}
