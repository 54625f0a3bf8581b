//! Report rendering.
//!
//! Supports an HTML page with a column chart and a colour-coded detail
//! table, and a JSON document for scripting.

use std::fmt::Write;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

use crate::error::ReportError;
use crate::series::Series;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
}

impl OutputFormat {
    /// File extension for a saved document.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
        }
    }
}

pub fn render(
    format: OutputFormat,
    report_day: NaiveDate,
    series: &Series,
) -> Result<String, ReportError> {
    match format {
        OutputFormat::Html => Ok(render_html(report_day, series)),
        OutputFormat::Json => render_json(report_day, series),
    }
}

/// One-line plain-text summary, used where HTML cannot be shown.
pub fn summary(report_day: NaiveDate, series: &Series) -> String {
    format!(
        "Report for {}: used {:.2} kWh, generated {:.2} kWh",
        report_day.format("%Y %b %-d"),
        series.totals.used,
        series.totals.generated
    )
}

pub fn render_html(report_day: NaiveDate, series: &Series) -> String {
    let mut chart_rows = String::new();
    let mut details = String::new();

    // Writing to a String cannot fail.
    for point in &series.points {
        let _ = writeln!(
            chart_rows,
            "[{{v: [{}, 0, 0], f: '{}'}}, {}, {}],",
            point.hour,
            point.chart_label(),
            point.sample.used,
            point.sample.generated
        );
        let _ = writeln!(
            details,
            "<tr><td>{}</td><td style='background-color: {}'>{:.2} kWh</td><td style='background-color: {}'>{:.2} kWh</td></tr>",
            point.label(),
            point.used_colour,
            point.sample.used,
            point.generated_colour,
            point.sample.generated
        );
    }

    let mut page = String::new();
    page.push_str("<html><body>");
    let _ = write!(page, "<style type='text/css'>{PAGE_STYLE}</style>");
    page.push_str("<p align='center'>");
    let _ = writeln!(page, "Report for: {}<br/>", report_day.format("%Y %b %-d"));
    let _ = writeln!(page, "Used: {:.2} kWh<br/>", series.totals.used);
    let _ = writeln!(page, "Generated: {:.2} kWh<br/>", series.totals.generated);
    page.push_str("<br/></p>");

    page.push_str(&CHART_TEMPLATE.replacen("$(points)", &chart_rows, 1));
    page.push_str("<br/>");

    page.push_str("<p align='center'>Details<br/>\n");
    page.push_str(
        "<table><tr><th class='details'>Time</th><th class='details'>Used</th><th class='details'>Generated</th></tr>\n",
    );
    page.push_str(&details);
    page.push_str("</table></p>");
    page.push_str("</body></html>");
    page
}

#[derive(Serialize)]
struct JsonReport<'a> {
    report_day: NaiveDate,
    #[serde(flatten)]
    series: &'a Series,
}

pub fn render_json(report_day: NaiveDate, series: &Series) -> Result<String, ReportError> {
    serde_json::to_string_pretty(&JsonReport { report_day, series })
        .map_err(|e| ReportError::Render(e.to_string()))
}

const PAGE_STYLE: &str = r#"
	p {
		font-family: arial;
	}

	table, th, td {
		text-align: center;
	}

	th.details {
		width: 110;
	}
"#;

const CHART_TEMPLATE: &str = r#"
  <script type="text/javascript" src="https://www.google.com/jsapi"></script>
  <div id="chart_div"></div>
  <script type='text/javascript'>
//<![CDATA[
google.load('visualization', '1', {packages: ['corechart', 'bar']});
google.setOnLoadCallback(drawColColors);

function drawColColors() {
      var data = new google.visualization.DataTable();
      data.addColumn('timeofday', 'Time of Day');
      data.addColumn('number', 'Used');
      data.addColumn('number', 'Generated');

      data.addRows([
        $(points)
      ]);

      var options = {
        title: 'Usage and Solar Generation',
        colors: ['#9575cd', '#33ac71'],
        chartArea: {width:'80%',height:100},
        hAxis: {
          title: 'Time of Day',
          format: 'h:mm a',
          viewWindow: {
            min: [0, 0, 0],
            max: [23, 59, 0]
          }
        },
        vAxis: {
          title: 'kWh',
          viewWindow: {
            min: 0
          }
        }
      };

      var chart = new google.visualization.ColumnChart(document.getElementById('chart_div'));
      chart.draw(data, options);
    }
//]]>
</script>
"#;
