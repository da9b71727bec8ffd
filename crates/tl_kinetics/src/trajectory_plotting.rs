use std::error::Error;
use plotters::prelude::*;
use plotters::style::Palette99;

use crate::trajectory::Trajectory;

/// Draw every species population of `trajectory` over time into an SVG
/// file.
pub fn plot_populations(
    trajectory: &Trajectory,
    filename: &str,
    title: &str,
) -> Result<(), Box<dyn Error>> {
    let t_max = trajectory.times().last().copied().unwrap_or(1.0).max(f64::MIN_POSITIVE);
    let y_max = trajectory.iter()
        .flat_map(|(_, row)| row.iter().copied())
        .fold(1.0_f64, f64::max);

    let root = SVGBackend::new(filename, (1024, 480)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..t_max, 0.0..(1.05 * y_max))?;

    chart
        .configure_mesh()
        .x_desc("time")
        .y_desc("population")
        .light_line_style(RGBColor(220, 220, 220))
        .axis_desc_style(("sans-serif", 18))
        .label_style(("sans-serif", 16))
        .draw()?;

    for (i, name) in trajectory.species().iter().enumerate() {
        let color = Palette99::pick(i).mix(0.9);
        chart.draw_series(LineSeries::new(trajectory.series(i), color.stroke_width(2)))?
            .label(name.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .position(SeriesLabelPosition::UpperRight)
        .label_font(("sans-serif", 16).into_font())
        .draw()?;

    root.present()?;
    Ok(())
}
