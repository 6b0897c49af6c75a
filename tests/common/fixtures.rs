//! Test documents.

/// An HTML page with one chart styled from a stylesheet.
pub const CHART_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <style>
    body { font-family: Georgia; color: #333; }
    .bar { fill: steelblue; }
    .bar.hot { fill: crimson; }
    .axis line { stroke: black; stroke-width: 2; }
  </style>
</head>
<body>
  <h1>Report</h1>
  <div id="wrapper">
    <svg id="chart" title="My Chart" width="120" height="80" viewBox="0 0 120 80" data-series="3" onclick="zoom()">
      <!-- bars -->
      <g class="axis"><line x1="0" y1="79" x2="120" y2="79"/></g>
      <g fill-opacity="0.8">
        <rect class="bar" x="10" y="20" width="20" height="59"/>
        <rect class="bar hot" x="50" y="40" width="20" height="39"/>
        <text x="10" y="15">Sales &amp; returns</text>
      </g>
    </svg>
  </div>
</body>
</html>"#;

/// A page with two charts and no titles.
pub const TWO_CHARTS: &str = r#"<html><body>
  <svg id="first" width="10" height="10"><rect width="10" height="10"/></svg>
  <section><svg id="second"><circle r="4"/></svg></section>
</body></html>"#;

/// A page without any SVG.
pub const NO_SVG: &str = "<html><body><p>Nothing to see</p></body></html>";

/// A standalone SVG file using an xlink reference.
pub const STANDALONE_SVG: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="64" height="48">
  <defs><circle id="dot" r="8" fill="gold"/></defs>
  <use xlink:href="#dot" x="32" y="24"/>
</svg>"##;

/// Editor output pasted into HTML: prefixed attributes without declarations.
pub const EDITOR_PAGE: &str = r#"<html><body>
  <svg width="20" height="10" sodipodi:docname="layers.svg">
    <g inkscape:label="Layer 1" inkscape:groupmode="layer"><rect width="20" height="10" fill="teal"/></g>
  </svg>
</body></html>"#;
