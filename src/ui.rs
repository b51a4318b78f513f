use chrono::{Duration, NaiveDate};

pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Dashboard page with the date inputs preset to the last thirty days.
pub fn render_index(today: NaiveDate) -> String {
    let start = today - Duration::days(DEFAULT_WINDOW_DAYS);
    INDEX_HTML
        .replace("{{START}}", &start.to_string())
        .replace("{{END}}", &today.to_string())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Painel de Casos</title>
  <style>
    :root {
      --bg: #eef1f6;
      --ink: #1f2a3a;
      --muted: #6b7a90;
      --card: #ffffff;
      --shadow: 0 18px 40px rgba(64, 81, 108, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 28px 18px 48px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: end;
      justify-content: space-between;
      gap: 18px;
      max-width: 1100px;
      margin: 0 auto 24px;
    }

    h1 {
      margin: 0;
      font-size: 1.8rem;
    }

    .range {
      display: flex;
      gap: 12px;
    }

    .range label {
      display: grid;
      gap: 4px;
      font-size: 0.85rem;
      color: var(--muted);
    }

    .range input {
      padding: 8px 10px;
      border-radius: 10px;
      border: 1px solid #c9d2e0;
      font: inherit;
    }

    main {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 20px;
      max-width: 1100px;
      margin: 0 auto;
    }

    .grafico-box {
      background: var(--card);
      border-radius: 18px;
      box-shadow: var(--shadow);
      padding: 18px 20px;
    }

    .grafico-box h3 {
      margin: 0 0 12px;
      font-size: 1rem;
    }

    svg {
      width: 100%;
      height: auto;
    }

    svg text {
      font-size: 11px;
      fill: var(--muted);
    }

    .legend {
      display: flex;
      flex-wrap: wrap;
      gap: 8px 14px;
      margin-top: 10px;
      font-size: 0.8rem;
    }

    .legend span::before {
      content: "";
      display: inline-block;
      width: 10px;
      height: 10px;
      margin-right: 6px;
      border-radius: 3px;
      background: var(--swatch);
    }

    .status {
      max-width: 1100px;
      margin: 0 auto 12px;
      color: #b0413e;
      min-height: 1.2em;
    }
  </style>
</head>
<body>
  <header>
    <h1>Painel de Casos</h1>
    <div class="range">
      <label>Início <input type="date" id="dataInicio" value="{{START}}" /></label>
      <label>Fim <input type="date" id="dataFim" value="{{END}}" /></label>
    </div>
  </header>
  <p class="status" id="status"></p>
  <main>
    <section class="grafico-box"><h3>Tipos de Caso</h3><div id="graficoRosca"></div></section>
    <section class="grafico-box"><h3>Distribuição de Idade das Vítimas</h3><div id="graficoDistribuicao"></div></section>
    <section class="grafico-box"><h3>Importância das Variáveis do Modelo</h3><div id="graficoModelo"></div></section>
    <section class="grafico-box"><h3>Probabilidade do Tipo de Caso por Idade</h3><div id="graficoProbabilidade"></div></section>
    <section class="grafico-box"><h3>Correlação entre Variáveis</h3><div id="graficoCorrelacao"></div></section>
    <section class="grafico-box"><h3>Acurácia por Classe (%)</h3><div id="graficoAcuracia"></div></section>
  </main>

  <script>
    const gradiente = ['#40516c', '#4a5d7c', '#53698c', '#5d759c', '#6b82a7', '#7b90b1', '#8b9dba'];
    const escapes = { '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' };
    // labels come from stored cases and must never be parsed as markup
    const esc = (text) => String(text).replace(/[&<>"']/g, (ch) => escapes[ch]);
    const statusEl = document.getElementById('status');
    const inicioEl = document.getElementById('dataInicio');
    const fimEl = document.getElementById('dataFim');

    // one drawing per slot, replaced wholesale on every refresh
    const replaceSlot = (id, markup) => {
      document.getElementById(id).innerHTML = markup;
    };

    const report = (context, err) => {
      console.error(context, err);
      statusEl.textContent = `${context}: ${err.message}`;
    };

    const getJson = async (url) => {
      const res = await fetch(url);
      if (!res.ok) {
        throw new Error((await res.text()) || res.statusText);
      }
      return res.json();
    };

    const legend = (labels) =>
      `<div class="legend">${labels
        .map((label, i) => `<span style="--swatch:${gradiente[i % gradiente.length]}">${esc(label)}</span>`)
        .join('')}</div>`;

    const doughnut = (labels, values) => {
      const total = values.reduce((a, b) => a + b, 0);
      if (!total) {
        return '<p>Sem dados no período.</p>';
      }
      const cx = 110, cy = 110, r = 90, inner = 52;
      let angle = -Math.PI / 2;
      const arcs = values.map((value, i) => {
        const sweep = (value / total) * Math.PI * 2;
        const end = angle + Math.min(sweep, Math.PI * 2 - 1e-4);
        const large = sweep > Math.PI ? 1 : 0;
        const p = (a, rad) => `${cx + rad * Math.cos(a)} ${cy + rad * Math.sin(a)}`;
        const d = `M ${p(angle, r)} A ${r} ${r} 0 ${large} 1 ${p(end, r)} L ${p(end, inner)} A ${inner} ${inner} 0 ${large} 0 ${p(angle, inner)} Z`;
        angle += sweep;
        return `<path d="${d}" fill="${gradiente[i % gradiente.length]}"><title>${esc(labels[i])}: ${esc(value)}</title></path>`;
      });
      return `<svg viewBox="0 0 220 220">${arcs.join('')}</svg>${legend(labels)}`;
    };

    const bars = (labels, values, { horizontal = false, min = 0, max = null, color = '#5d759c' } = {}) => {
      const width = 420, height = horizontal ? Math.max(160, labels.length * 26 + 30) : 240, pad = horizontal ? 130 : 34;
      const top = max ?? Math.max(1, ...values);
      const span = top - min || 1;
      const items = values.map((value, i) => {
        if (horizontal) {
          const band = (height - 30) / labels.length;
          const w = ((Math.abs(value) - 0) / Math.max(1e-9, Math.max(...values.map(Math.abs)))) * (width - pad - 10);
          const y = 10 + i * band;
          return `<rect x="${pad}" y="${y}" width="${w}" height="${band * 0.7}" fill="${color}"><title>${esc(value)}</title></rect>` +
            `<text x="${pad - 6}" y="${y + band * 0.5}" text-anchor="end">${esc(labels[i])}</text>`;
        }
        const band = (width - pad) / labels.length;
        const zero = height - 24 - ((0 - min) / span) * (height - 34);
        const y = height - 24 - ((value - min) / span) * (height - 34);
        return `<rect x="${pad + i * band + band * 0.15}" y="${Math.min(y, zero)}" width="${band * 0.7}" height="${Math.abs(zero - y)}" fill="${Array.isArray(color) ? color[i % color.length] : color}"><title>${esc(labels[i])}: ${esc(value)}</title></rect>` +
          `<text x="${pad + i * band + band / 2}" y="${height - 8}" text-anchor="middle">${esc(labels[i])}</text>`;
      });
      return `<svg viewBox="0 0 ${width} ${height}">${items.join('')}</svg>`;
    };

    const lines = (labels, series) => {
      const width = 420, height = 240, pad = 34;
      const x = (i) => pad + (i * (width - pad - 10)) / Math.max(1, labels.length - 1);
      const y = (v) => height - 24 - v * (height - 34);
      const paths = series.map((s, idx) => {
        const d = s.data.map((v, i) => `${i ? 'L' : 'M'} ${x(i)} ${y(v)}`).join(' ');
        return `<path d="${d}" fill="none" stroke-width="2" stroke="${gradiente[idx % gradiente.length]}" />`;
      });
      const ticks = labels.map((label, i) => `<text x="${x(i)}" y="${height - 8}" text-anchor="middle">${esc(label)}</text>`);
      return `<svg viewBox="0 0 ${width} ${height}">${paths.join('')}${ticks.join('')}</svg>${legend(series.map((s) => s.label))}`;
    };

    const atualizarGraficos = async () => {
      const params = new URLSearchParams({ start: inicioEl.value, end: fimEl.value });
      try {
        const data = await getJson(`/api/dashboard?${params}`);
        statusEl.textContent = '';
        replaceSlot('graficoRosca', doughnut(Object.keys(data.occurrence_counts), Object.values(data.occurrence_counts)));
        replaceSlot('graficoDistribuicao', bars(data.age_bins.labels, data.age_bins.counts));
      } catch (err) {
        report('Erro ao carregar dados', err);
      }
    };

    const graficoModelo = async () => {
      try {
        const coefs = await getJson('/api/model/coefs');
        replaceSlot('graficoModelo', bars(coefs.map((c) => c.feature), coefs.map((c) => c.importance), { horizontal: true }));
      } catch (err) {
        report('Erro ao carregar os coeficientes do modelo', err);
      }
    };

    const graficoProbabilidade = async () => {
      try {
        const dados = await getJson('/api/model/age-probabilities');
        if (!dados.length) {
          return;
        }
        const classes = Object.keys(dados[0].probabilidades);
        replaceSlot('graficoProbabilidade', lines(
          dados.map((d) => d.faixa),
          classes.map((classe) => ({ label: classe, data: dados.map((d) => d.probabilidades[classe] ?? 0) }))
        ));
      } catch (err) {
        report('Erro no gráfico de probabilidade por idade', err);
      }
    };

    const graficoCorrelacao = async () => {
      try {
        const { variaveis, matriz } = await getJson('/api/model/correlations');
        replaceSlot('graficoCorrelacao', bars(variaveis, matriz[0], { min: -1, max: 1, color: gradiente }));
      } catch (err) {
        report('Erro ao carregar gráfico de correlação', err);
      }
    };

    const graficoAcuracia = async () => {
      try {
        const { classes, precisao } = await getJson('/api/model/accuracy');
        replaceSlot('graficoAcuracia', bars(classes, precisao, { max: 100, color: '#7b90b1' }));
      } catch (err) {
        report('Erro ao carregar gráfico de acurácia por classe', err);
      }
    };

    inicioEl.addEventListener('change', atualizarGraficos);
    fimEl.addEventListener('change', atualizarGraficos);

    atualizarGraficos();
    graficoModelo();
    graficoProbabilidade();
    graficoCorrelacao();
    graficoAcuracia();
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_presets_the_last_thirty_days() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let html = render_index(today);
        assert!(html.contains(r#"id="dataInicio" value="2024-02-09""#));
        assert!(html.contains(r#"id="dataFim" value="2024-03-10""#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn chart_labels_are_escaped_before_markup() {
        let html = render_index(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert!(html.contains("const esc = (text) =>"));
        for raw in ["${label}", "${labels[i]}", "${value}</title>"] {
            assert!(!html.contains(raw), "unescaped interpolation {raw}");
        }
        assert!(html.contains("${esc(labels[i])}"));
        assert!(html.contains("${esc(label)}"));
    }
}
