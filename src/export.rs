// Document export: a self-contained HTML page (document JSON plus one fixed
// interpreter script) or a static PNG/SVG snapshot of the current frame.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::graph;
use crate::layout::Document;
use crate::{ExportFormat, ExportOptions};

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{TITLE}}</title>
<style>
body { font-family: sans-serif; margin: 16px; }
#plotwire-root { display: flex; gap: 12px; }
.plotwire-control { display: flex; align-items: center; gap: 8px; margin: 4px 0; }
canvas { border: 1px solid #ddd; }
</style>
</head>
<body>
<div id="plotwire-root"></div>
<script type="application/json" id="plotwire-doc">{{DOCUMENT}}</script>
<script>
{{INTERPRETER}}
</script>
</body>
</html>
"#;

/// Executes the declarative swap rules carried in the document. The same
/// script serves every document; bindings are data, never code.
const INTERPRETER: &str = r##"(function () {
  var doc = JSON.parse(document.getElementById("plotwire-doc").textContent);
  var fig = doc.figure;
  var root = document.getElementById("plotwire-root");
  root.style.flexDirection = doc.arrangement === "row" ? "row" : "column";

  var canvas = document.createElement("canvas");
  canvas.width = fig.config.width;
  canvas.height = fig.config.height;
  root.appendChild(canvas);
  var panel = document.createElement("div");
  root.appendChild(panel);
  var ctx = canvas.getContext("2d");
  var MARGIN = 40;

  function nums(col) {
    return (col || []).filter(function (v) { return typeof v === "number" && isFinite(v); });
  }

  function extent(values) {
    if (!values.length) { return [0, 1]; }
    var lo = Math.min.apply(null, values), hi = Math.max.apply(null, values);
    if (lo === hi) { return [lo - 1, hi + 1]; }
    var pad = (hi - lo) * 0.05;
    return [lo - pad, hi + pad];
  }

  function bounds() {
    var xs = [], ys = [];
    fig.renderers.forEach(function (r) {
      var d = r.data, g = r.glyph;
      if (g.type === "bar") {
        nums(d.x).forEach(function (x) { xs.push(x - g.width / 2, x + g.width / 2); });
        ys.push(0);
        ys = ys.concat(nums(d.top));
      } else if (g.type === "image") {
        xs.push(d.x[0], d.x[0] + d.dw[0]);
        ys.push(d.y[0], d.y[0] + d.dh[0]);
      } else {
        xs = xs.concat(nums(d.x));
        ys = ys.concat(nums(d.y));
      }
    });
    return {
      x: fig.config.x_range || extent(xs),
      y: fig.config.y_range || extent(ys)
    };
  }

  function projector(b) {
    var w = canvas.width - 2 * MARGIN, h = canvas.height - 2 * MARGIN;
    return {
      x: function (v) { return MARGIN + (v - b.x[0]) / (b.x[1] - b.x[0]) * w; },
      y: function (v) { return canvas.height - MARGIN - (v - b.y[0]) / (b.y[1] - b.y[0]) * h; }
    };
  }

  function pick(r, col, i, fallback) {
    var c = r.data[col];
    if (c && c[i] !== undefined && c[i] !== null) { return c[i]; }
    return r.style[col] !== undefined ? r.style[col] : fallback;
  }

  function marker(shape, x, y, s) {
    var h = s / 2;
    ctx.beginPath();
    switch (shape) {
      case "square": ctx.rect(x - h, y - h, s, s); ctx.fill(); return;
      case "triangle": ctx.moveTo(x, y - h); ctx.lineTo(x + h, y + h); ctx.lineTo(x - h, y + h); ctx.closePath(); ctx.fill(); return;
      case "inverted_triangle": ctx.moveTo(x, y + h); ctx.lineTo(x + h, y - h); ctx.lineTo(x - h, y - h); ctx.closePath(); ctx.fill(); return;
      case "diamond": ctx.moveTo(x, y - h); ctx.lineTo(x + h, y); ctx.lineTo(x, y + h); ctx.lineTo(x - h, y); ctx.closePath(); ctx.fill(); return;
      case "cross": ctx.moveTo(x - h, y); ctx.lineTo(x + h, y); ctx.moveTo(x, y - h); ctx.lineTo(x, y + h); ctx.stroke(); return;
      case "x": ctx.moveTo(x - h, y - h); ctx.lineTo(x + h, y + h); ctx.moveTo(x + h, y - h); ctx.lineTo(x - h, y + h); ctx.stroke(); return;
      case "asterisk":
        ctx.moveTo(x - h, y); ctx.lineTo(x + h, y); ctx.moveTo(x, y - h); ctx.lineTo(x, y + h);
        ctx.moveTo(x - h, y - h); ctx.lineTo(x + h, y + h); ctx.moveTo(x + h, y - h); ctx.lineTo(x - h, y + h);
        ctx.stroke(); return;
      case "dot": ctx.arc(x, y, 1.5, 0, 2 * Math.PI); ctx.fill(); return;
      default: ctx.arc(x, y, h, 0, 2 * Math.PI); ctx.fill();
    }
  }

  function slot(mapper, v, lo, hi) {
    var n = mapper.palette.length;
    if (!n || v === null || isNaN(v)) { return -1; }
    if (mapper.type === "categorical") { return Math.max(0, Math.floor(v)) % n; }
    if (mapper.type === "log") {
      lo = Math.max(lo, Number.MIN_VALUE);
      v = Math.log(Math.max(v, lo)); hi = Math.log(Math.max(hi, lo)); lo = Math.log(lo);
    }
    var t = hi > lo ? Math.min(1, Math.max(0, (v - lo) / (hi - lo))) : 0;
    return Math.min(n - 1, Math.round(t * (n - 1)));
  }

  function drawImage(r, p) {
    var grid = r.data.image[0], mapper = r.glyph.mapper;
    var rows = grid.length, cols = rows ? grid[0].length : 0;
    if (!rows || !cols) { return; }
    var flat = [].concat.apply([], grid).filter(function (v) { return v !== null && isFinite(v); });
    var lo = Math.min.apply(null, flat), hi = Math.max.apply(null, flat);
    var x0 = r.data.x[0], y0 = r.data.y[0], cw = r.data.dw[0] / cols, ch = r.data.dh[0] / rows;
    for (var i = 0; i < rows; i++) {
      for (var j = 0; j < cols; j++) {
        var k = slot(mapper, grid[i][j], lo, hi);
        if (k < 0) { continue; }
        ctx.fillStyle = mapper.palette[k];
        var left = p.x(x0 + j * cw), top = p.y(y0 + (i + 1) * ch);
        ctx.fillRect(left, top, p.x(x0 + (j + 1) * cw) - left + 0.5, p.y(y0 + i * ch) - top + 0.5);
      }
    }
  }

  function draw() {
    ctx.clearRect(0, 0, canvas.width, canvas.height);
    var b = bounds(), p = projector(b);
    ctx.strokeStyle = "#000";
    ctx.strokeRect(MARGIN, MARGIN, canvas.width - 2 * MARGIN, canvas.height - 2 * MARGIN);
    ctx.fillStyle = "#000";
    ctx.textAlign = "center";
    ctx.fillText(fig.config.title || "", canvas.width / 2, MARGIN / 2);
    fig.renderers.forEach(function (r) {
      var d = r.data, g = r.glyph;
      ctx.globalAlpha = r.style.alpha !== undefined ? r.style.alpha : 1;
      if (g.type === "image") {
        drawImage(r, p);
      } else if (g.type === "line") {
        ctx.strokeStyle = r.style.color || "#1f77b4";
        ctx.lineWidth = r.style.line_width || 1;
        ctx.beginPath();
        d.x.forEach(function (x, i) {
          if (i === 0) { ctx.moveTo(p.x(x), p.y(d.y[i])); } else { ctx.lineTo(p.x(x), p.y(d.y[i])); }
        });
        ctx.stroke();
      } else if (g.type === "bar") {
        d.x.forEach(function (x, i) {
          ctx.fillStyle = pick(r, "color", i, "#1f77b4");
          var left = p.x(x - g.width / 2), right = p.x(x + g.width / 2);
          var top = p.y(Math.max(0, d.top[i])), bottom = p.y(Math.min(0, d.top[i]));
          ctx.fillRect(left, top, right - left, bottom - top);
        });
      } else {
        d.x.forEach(function (x, i) {
          var color = pick(r, "color", i, "#1f77b4");
          ctx.fillStyle = color;
          ctx.strokeStyle = color;
          ctx.lineWidth = r.style.line_width || 1;
          marker(pick(r, "marker", i, g.marker), p.x(x), p.y(d.y[i]), pick(r, "size", i, 6));
        });
      }
    });
    ctx.globalAlpha = 1;
  }

  function applyRule(rule, index) {
    var frame = rule.frames[index];
    if (!frame) { return; }
    var r = fig.renderers[rule.renderer];
    Object.keys(frame).forEach(function (name) {
      r.data[name] = rule.wrap_single ? [frame[name]] : frame[name];
    });
    r.revision += 1;
    draw();
  }

  doc.controls.forEach(function (node) {
    var row = document.createElement("div");
    row.className = "plotwire-control";
    var label = document.createElement("label");
    var output = document.createElement("span");
    var slider = document.createElement("input");
    slider.type = "range";
    slider.min = node.slider.start;
    slider.max = node.slider.end;
    slider.step = node.slider.step;
    slider.value = node.slider.value;
    label.textContent = node.slider.label;
    output.textContent = node.slider.value;
    slider.addEventListener("input", function () {
      output.textContent = slider.value;
      applyRule(node.rule, parseInt(slider.value, 10));
    });
    row.appendChild(label);
    row.appendChild(slider);
    row.appendChild(output);

    if (node.play) {
      var button = document.createElement("button");
      var timer = null;
      button.textContent = node.play.label;
      button.addEventListener("click", function () {
        if (timer !== null) {
          clearInterval(timer);
          timer = null;
          return;
        }
        var value = node.slider.start;
        var step = function () {
          slider.value = value;
          slider.dispatchEvent(new Event("input"));
          value += node.slider.step;
          if (value > node.slider.end) { clearInterval(timer); timer = null; }
        };
        timer = setInterval(step, node.play.interval_ms);
        step();
      });
      row.appendChild(button);
    }
    panel.appendChild(row);
  });

  draw();
})();"##;

/// Build the standalone HTML page for `document`
pub fn render_html(document: &Document, options: &ExportOptions) -> Result<String> {
    let json = serde_json::to_string(document).context("Failed to serialize document")?;
    let title = options
        .title
        .as_deref()
        .unwrap_or_else(|| document.figure.config().title.as_str());

    Ok(PAGE_TEMPLATE
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{INTERPRETER}}", INTERPRETER)
        .replace("{{DOCUMENT}}", &escape_script(&json)))
}

/// Render `document` in the requested format as raw bytes
pub fn render(document: &Document, options: &ExportOptions) -> Result<Vec<u8>> {
    let config = document.figure.config();
    let width = options.width.unwrap_or(config.width);
    let height = options.height.unwrap_or(config.height);

    log::debug!(
        target: "plotwire",
        "exporting {:?} ({}x{}, {} renderers, {} controls)",
        options.format,
        width,
        height,
        document.figure.renderers().len(),
        document.controls.len()
    );

    match options.format {
        ExportFormat::Html => render_html(document, options).map(String::into_bytes),
        ExportFormat::Png => {
            if !document.controls.is_empty() {
                log::warn!(target: "plotwire", "PNG export is a static snapshot; controls are dropped");
            }
            graph::render_png(&document.figure, width, height)
        }
        ExportFormat::Svg => {
            if !document.controls.is_empty() {
                log::warn!(target: "plotwire", "SVG export is a static snapshot; controls are dropped");
            }
            graph::render_svg(&document.figure, width, height).map(String::into_bytes)
        }
    }
}

/// Write `document` to `path`
pub fn export<P: AsRef<Path>>(document: &Document, path: P, options: &ExportOptions) -> Result<()> {
    let path = path.as_ref();
    let bytes = render(document, options)?;
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!(target: "plotwire", "wrote {}", path.display());
    Ok(())
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// Keeps embedded JSON from closing its script element early
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}
